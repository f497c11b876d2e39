// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered project file loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `~/.config/dockyard/dockyard.toml` (user defaults)
//! 3. `./dockyard.toml`, or an explicit path
//! 4. `DOCKYARD_PROJECT_*` and `DOCKYARD_PLUGINS_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DockyardConfig;

/// File name looked up in the project directory.
pub const PROJECT_FILE: &str = "dockyard.toml";

/// Location of the user-level defaults file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dockyard").join(PROJECT_FILE))
}

/// Load `./dockyard.toml` over user defaults, with env overrides.
pub fn load_config() -> Result<DockyardConfig, figment::Error> {
    build_figment(Path::new(PROJECT_FILE)).extract()
}

/// Load a specific project file over user defaults, with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<DockyardConfig, figment::Error> {
    build_figment(path).extract()
}

/// Load from a TOML string only. No user file, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<DockyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DockyardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the layered Figment before extraction.
///
/// Missing files are skipped.
pub fn build_figment(project_file: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(DockyardConfig::default()));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(project_file)).merge(env_provider())
}

/// Environment provider with an explicit section mapping.
///
/// Only the first underscore after the section name becomes a dot, so
/// `DOCKYARD_PROJECT_PORT_WINDOW` maps to `project.port_window`. Variables
/// outside the known sections are ignored rather than rejected.
fn env_provider() -> Env {
    Env::prefixed("DOCKYARD_")
        .filter(|key| {
            let key = key.as_str().to_ascii_lowercase();
            key.starts_with("project_") || key.starts_with("plugins_")
        })
        .map(|key| {
            let lowered = key.as_str().to_ascii_lowercase();
            lowered
                .replacen("project_", "project.", 1)
                .replacen("plugins_", "plugins.", 1)
                .into()
        })
}
