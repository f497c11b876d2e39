// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Project file model.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key in
//! `dockyard.toml` is reported instead of silently ignored.

use std::path::PathBuf;

use dockyard_core::ConfigMap;
use serde::{Deserialize, Serialize};

/// Top-level contents of `dockyard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DockyardConfig {
    /// Project identity and generation settings.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Selected services, in manifest order.
    #[serde(default)]
    pub services: Vec<ServiceSelection>,

    /// Project plugin sources.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl DockyardConfig {
    /// Names of the selected services, in declaration order.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }
}

/// The `[project]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Compose project name; also the middle label of proxy hostnames.
    #[serde(default = "default_project_name")]
    pub name: String,

    /// Hostname suffix for proxy routes (`<service>.<project>.<domain>`).
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Route proxy traffic through the TLS entrypoint.
    #[serde(default)]
    pub tls: bool,

    /// Emit reverse-proxy labels for HTTP-exposed services.
    #[serde(default = "default_true")]
    pub proxy: bool,

    /// External network shared with the reverse proxy.
    #[serde(default = "default_proxy_network")]
    pub proxy_network: String,

    /// How many ports above a taken one to probe.
    #[serde(default = "default_port_window")]
    pub port_window: u16,

    /// Manifest path, relative to the project directory.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            domain: default_domain(),
            tls: false,
            proxy: true,
            proxy_network: default_proxy_network(),
            port_window: default_port_window(),
            output: default_output(),
        }
    }
}

fn default_project_name() -> String {
    "dockyard".to_string()
}

fn default_domain() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

fn default_proxy_network() -> String {
    "dockyard-proxy".to_string()
}

fn default_port_window() -> u16 {
    10
}

fn default_output() -> PathBuf {
    PathBuf::from("docker-compose.yml")
}

/// One `[[services]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSelection {
    /// Catalog name of the service.
    pub name: String,

    /// Host ports to request instead of the definition's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,

    /// Overrides validated against the service's config schema.
    #[serde(default)]
    pub config: ConfigMap,
}

/// The `[plugins]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Plugin manifest files, registered in this order after bundled plugins.
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Directory searched for templates before the bundled set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_sensible() {
        let config = DockyardConfig::default();
        assert_eq!(config.project.name, "dockyard");
        assert_eq!(config.project.domain, "localhost");
        assert!(config.project.proxy);
        assert!(!config.project.tls);
        assert_eq!(config.project.port_window, 10);
        assert_eq!(config.project.output, PathBuf::from("docker-compose.yml"));
        assert!(config.services.is_empty());
        assert!(config.plugins.paths.is_empty());
    }

    #[test]
    fn services_deserialize_in_order() {
        let toml_str = r#"
[project]
name = "shop"

[[services]]
name = "postgres"
ports = [15432]

[services.config]
POSTGRES_DB = "orders"
version = "15"

[[services]]
name = "redis"
"#;
        let config: DockyardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service_names(), vec!["postgres", "redis"]);
        assert_eq!(config.services[0].ports, Some(vec![15432]));
        assert_eq!(config.services[0].config["POSTGRES_DB"], json!("orders"));
        assert!(config.services[1].config.is_empty());
        assert!(config.services[1].ports.is_none());
    }

    #[test]
    fn services_deny_unknown_fields() {
        let toml_str = r#"
[[services]]
name = "redis"
port = [6380]
"#;
        assert!(toml::from_str::<DockyardConfig>(toml_str).is_err());
    }
}
