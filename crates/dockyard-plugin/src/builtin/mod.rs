// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bundled plugins and their templates.
//!
//! These plugins are compiled into the binary and always load first, in the
//! order returned by [`bundled_plugins`]. Project plugins registered later
//! may override any service or template they provide.

pub mod databases;
pub mod db_tools;
pub mod infrastructure;
pub mod utilities;

pub use databases::DatabasesPlugin;
pub use db_tools::DbToolsPlugin;
pub use infrastructure::InfrastructurePlugin;
pub use utilities::UtilitiesPlugin;

use dockyard_core::{value_to_env_string, ConfigMap};

use crate::capability::Plugin;

/// Version reported by every bundled plugin.
pub const BUNDLED_VERSION: semver::Version = semver::Version::new(0, 1, 0);

/// Templates shipped with the bundled services, keyed by template reference.
pub const BUNDLED_TEMPLATES: &[(&str, &str)] = &[
    ("postgres.yml", include_str!("../../templates/postgres.yml")),
    ("mysql.yml", include_str!("../../templates/mysql.yml")),
    ("sqlite.yml", include_str!("../../templates/sqlite.yml")),
    ("redis.yml", include_str!("../../templates/redis.yml")),
    ("rabbitmq.yml", include_str!("../../templates/rabbitmq.yml")),
    ("meilisearch.yml", include_str!("../../templates/meilisearch.yml")),
    ("minio.yml", include_str!("../../templates/minio.yml")),
    ("mailpit.yml", include_str!("../../templates/mailpit.yml")),
    ("adminer.yml", include_str!("../../templates/adminer.yml")),
    ("traefik.yml", include_str!("../../templates/traefik.yml")),
];

/// Returns the bundled plugins in their fixed load order.
pub fn bundled_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(DatabasesPlugin),
        Box::new(InfrastructurePlugin),
        Box::new(UtilitiesPlugin),
        Box::new(DbToolsPlugin),
    ]
}

/// Look up a bundled template by reference.
pub fn bundled_template(template_ref: &str) -> Option<&'static str> {
    BUNDLED_TEMPLATES
        .iter()
        .find(|(name, _)| *name == template_ref)
        .map(|(_, body)| *body)
}

/// String form of a config value, empty when absent.
pub(crate) fn config_str(config: &ConfigMap, key: &str) -> String {
    config.get(key).map(value_to_env_string).unwrap_or_default()
}
