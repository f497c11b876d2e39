// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Project file (`dockyard.toml`) handling.
//!
//! Strict TOML parsing (`deny_unknown_fields`), layered loading with user
//! defaults and environment overrides, and miette diagnostics with typo
//! suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use dockyard_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("project: {}", config.project.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str, PROJECT_FILE};
pub use model::{DockyardConfig, PluginsConfig, ProjectConfig, ServiceSelection};

/// Load `./dockyard.toml` (over user defaults and env) and validate it.
pub fn load_and_validate() -> Result<DockyardConfig, Vec<ConfigError>> {
    load_and_validate_from_path(Path::new(PROJECT_FILE))
}

/// Load a specific project file (over user defaults and env) and validate it.
pub fn load_and_validate_from_path(path: &Path) -> Result<DockyardConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(path),
        )),
    }
}

/// Load a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<DockyardConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read the TOML files that may have contributed, for error spans.
fn collect_toml_sources(project_file: &Path) -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(project_file) {
        let path = if project_file.is_absolute() {
            project_file.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|d| d.join(project_file))
                .unwrap_or_else(|_| project_file.to_path_buf())
        };
        sources.push((path.display().to_string(), content));
    }

    if let Some(user) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&user)
    {
        sources.push((user.display().to_string(), content));
    }

    sources
}
