// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the plugin, compose, and CLI crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

/// Key/value configuration map.
///
/// Backed by `serde_json::Map`, which keeps keys sorted so every traversal
/// is deterministic.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Category of a composable service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ServiceCategory {
    Database,
    Cache,
    Queue,
    Search,
    Storage,
    Utility,
    Misc,
}

/// Identity of an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginIdentity {
    /// Globally unique plugin name.
    pub name: String,
    /// Plugin version.
    pub version: semver::Version,
    /// Human-readable description.
    pub description: String,
    /// Dependency declarations. Not interpreted by the engine.
    #[serde(default)]
    pub requires: Vec<String>,
}

/// One selected service within a project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, matching a service catalog entry.
    pub name: String,
    /// Category of the service.
    #[serde(rename = "type")]
    pub category: ServiceCategory,
    /// Validated environment variables.
    #[serde(default)]
    pub environment: ConfigMap,
    /// Allocated host ports, positionally paired with the definition's
    /// internal ports.
    #[serde(default)]
    pub ports: Vec<u16>,
}

/// The resolved, per-project selection of services.
///
/// Produced by the configuration pipeline and never patched in place;
/// re-run the pipeline to change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Project name, used for manifest naming and proxy host rules.
    pub project: String,
    /// Selected services in declaration order.
    pub services: Vec<ServiceConfig>,
}

impl Configuration {
    /// Look up a selected service by name.
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }

    /// All allocated host ports, in configuration order.
    pub fn host_ports(&self) -> Vec<u16> {
        self.services
            .iter()
            .flat_map(|s| s.ports.iter().copied())
            .collect()
    }
}

/// Name of a config value's runtime type, as used in validation messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        // Integer fields are i64; larger values cannot be stored.
        Value::Number(n) if n.is_u64() => "integer beyond 64-bit signed range",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a scalar config value as an environment-variable string.
pub fn value_to_env_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
