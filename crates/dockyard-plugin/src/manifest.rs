// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative project plugins loaded from TOML manifests.
//!
//! A manifest declares a plugin identity, any number of services (with their
//! config schema), and template overrides:
//!
//! ```toml
//! [plugin]
//! name = "redis-stack"
//! version = "1.0.0"
//! description = "Redis Stack in place of plain Redis"
//!
//! [[services]]
//! name = "redis"
//! category = "Cache"
//! template = "templates/redis-stack.yml"
//! ports = [6379, 8001]
//! internal_ports = [6379, 8001]
//!
//! [[services.fields]]
//! key = "REDIS_ARGS"
//! type = "string"
//! default = "--save 60 1"
//!
//! [[overrides]]
//! template = "postgres.yml"
//! replacement = "templates/postgres.yml"
//! ```
//!
//! Relative template paths are resolved against the manifest's directory.
//! A bare service template name stays a catalog reference (bundled or from
//! `templates_dir`) unless a file of that name sits next to the manifest.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use dockyard_core::{ConfigMap, DockyardError, ServiceCategory};
use serde::Deserialize;

use crate::capability::{Plugin, Provides, TemplateOverride};
use crate::schema::{ConfigSchema, Field};
use crate::service::{HealthCheck, ServiceDefinition};

/// A plugin declared by a TOML manifest.
#[derive(Debug, Clone)]
pub struct ManifestPlugin {
    name: String,
    version: semver::Version,
    description: String,
    requires: Vec<String>,
    services: Vec<ServiceSpec>,
    overrides: Vec<TemplateOverride>,
}

/// Intermediate TOML deserialization struct for a plugin manifest.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    plugin: PluginSection,
    #[serde(default)]
    services: Vec<ServiceSpec>,
    #[serde(default)]
    overrides: Vec<OverrideSpec>,
}

/// The `[plugin]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    requires: Vec<String>,
}

/// One `[[services]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceSpec {
    name: String,
    category: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    ports: Vec<u16>,
    #[serde(default)]
    internal_ports: Vec<u16>,
    #[serde(default)]
    http: bool,
    #[serde(default)]
    defaults: ConfigMap,
    #[serde(default)]
    health_check: Option<HealthCheckSpec>,
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct HealthCheckSpec {
    test: Vec<String>,
    #[serde(default = "default_interval_secs")]
    interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "default_retries")]
    retries: u32,
}

fn default_interval_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_retries() -> u32 {
    5
}

/// One `[[overrides]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideSpec {
    template: String,
    replacement: String,
}

impl ServiceSpec {
    fn into_definition(self) -> Result<ServiceDefinition, DockyardError> {
        let category = ServiceCategory::from_str(&self.category).map_err(|_| {
            DockyardError::InvalidServiceDefinition {
                name: self.name.clone(),
                reason: format!(
                    "unknown category '{}'. Expected one of: Database, Cache, Queue, Search, Storage, Utility, Misc",
                    self.category
                ),
            }
        })?;

        let mut schema = ConfigSchema::new();
        for field in self.fields {
            schema.declare(field)?;
        }

        let mut builder = ServiceDefinition::builder(&self.name, category)
            .description(self.description)
            .icon(self.icon)
            .ports(self.ports, self.internal_ports)
            .default_config(self.defaults);
        if let Some(template) = self.template {
            builder = builder.template(template);
        }
        if let Some(display_name) = self.display_name {
            builder = builder.display_name(display_name);
        }
        if let Some(hc) = self.health_check {
            builder = builder.health_check(HealthCheck {
                test: hc.test,
                interval: Duration::from_secs(hc.interval_secs),
                timeout: Duration::from_secs(hc.timeout_secs),
                retries: hc.retries,
            });
        }
        if !schema.is_empty() {
            builder = builder.schema(schema);
        }
        if self.http {
            builder = builder.http();
        }
        builder.build()
    }
}

/// Parse a plugin manifest from TOML content.
///
/// Relative paths are joined onto `base_dir` (see [`resolve_template`] for
/// bare service template names). Validates that the
/// name is non-empty and the version is valid semver. Service-level
/// problems (bad category, unpaired ports) surface when the plugin is
/// registered.
pub fn parse_plugin_manifest(
    toml_content: &str,
    base_dir: &Path,
) -> Result<ManifestPlugin, DockyardError> {
    let file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| DockyardError::Config(format!("invalid plugin manifest: {e}")))?;

    let section = file.plugin;
    if section.name.trim().is_empty() {
        return Err(DockyardError::Config(
            "plugin manifest: name must not be empty".to_string(),
        ));
    }
    if section.version.is_empty() {
        return Err(DockyardError::Config(
            "plugin manifest: version must not be empty".to_string(),
        ));
    }
    let version = semver::Version::parse(&section.version).map_err(|e| {
        DockyardError::Config(format!(
            "plugin manifest `{}`: invalid version '{}': {e}",
            section.name, section.version
        ))
    })?;

    let services = file
        .services
        .into_iter()
        .map(|mut spec| {
            if let Some(template) = spec.template.take() {
                spec.template = Some(resolve_template(base_dir, &template));
            }
            spec
        })
        .collect();

    let overrides = file
        .overrides
        .into_iter()
        .map(|o| TemplateOverride::new(o.template, base_dir.join(o.replacement)))
        .collect();

    Ok(ManifestPlugin {
        name: section.name,
        version,
        description: section.description,
        requires: section.requires,
        services,
        overrides,
    })
}

/// Read and parse a plugin manifest file.
pub fn load_plugin_manifest(path: &Path) -> Result<ManifestPlugin, DockyardError> {
    let content = std::fs::read_to_string(path).map_err(|source| DockyardError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_plugin_manifest(&content, base_dir)
}

/// Resolve a service template reference against the manifest directory.
///
/// Paths with a directory component are always joined onto `base_dir`. A
/// bare file name is joined only when that file exists beside the manifest;
/// otherwise it is kept as a reference into the template store.
fn resolve_template(base_dir: &Path, template: &str) -> String {
    let candidate = Path::new(template);
    let bare = candidate.components().count() == 1;
    let joined = base_dir.join(candidate);
    if bare && !joined.is_file() {
        template.to_string()
    } else {
        joined.display().to_string()
    }
}

impl Plugin for ManifestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        self.version.clone()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn requires(&self) -> Vec<String> {
        self.requires.clone()
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        self.services
            .iter()
            .cloned()
            .map(|spec| Provides::new(spec.name.clone(), move || spec.into_definition()))
            .collect()
    }

    fn template_overrides(&self) -> Vec<Provides<TemplateOverride>> {
        self.overrides
            .iter()
            .cloned()
            .map(|o| {
                Provides::new(o.original.clone(), move || {
                    Ok::<_, DockyardError>(o)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::extract::{CapabilityExtractor, ServiceExtractor, TemplateOverrideExtractor};
    use crate::schema::FieldType;
    use serde_json::json;

    const REDIS_STACK: &str = r#"
[plugin]
name = "redis-stack"
version = "1.2.0"
description = "Redis Stack in place of plain Redis"
requires = ["infrastructure"]

[[services]]
name = "redis"
category = "cache"
template = "templates/redis-stack.yml"
display_name = "Redis Stack"
ports = [6379, 8001]
internal_ports = [6379, 8001]
http = true

[services.defaults]
version = "7.4.0-v0"

[services.health_check]
test = ["CMD", "redis-cli", "ping"]
retries = 3

[[services.fields]]
key = "REDIS_ARGS"
type = "string"
default = "--save 60 1"
label = "Server arguments"

[[services.fields]]
key = "MAXMEMORY_MB"
type = "integer"
default = 256
min = 16
max = 4096

[[overrides]]
template = "postgres.yml"
replacement = "templates/postgres.yml"
"#;

    #[test]
    fn parse_full_manifest() {
        let plugin = parse_plugin_manifest(REDIS_STACK, Path::new("plugins")).unwrap();
        assert_eq!(plugin.name(), "redis-stack");
        assert_eq!(plugin.version().to_string(), "1.2.0");
        assert_eq!(plugin.requires(), vec!["infrastructure"]);

        let services = ServiceExtractor.extract(&plugin).unwrap();
        assert_eq!(services.len(), 1);
        let redis = &services[0];
        assert_eq!(redis.category(), ServiceCategory::Cache);
        assert_eq!(
            PathBuf::from(redis.template_ref()),
            Path::new("plugins").join("templates/redis-stack.yml")
        );
        assert_eq!(redis.http_port(), Some(6379));
        assert_eq!(redis.default_config()["version"], json!("7.4.0-v0"));
        let hc = redis.health_check().unwrap();
        assert_eq!(hc.retries, 3);
        assert_eq!(hc.interval, Duration::from_secs(10));

        let schema = redis.schema().unwrap();
        assert_eq!(schema.len(), 2);
        let max_mem = schema.get("MAXMEMORY_MB").unwrap();
        assert_eq!(max_mem.field_type, FieldType::Integer);
        assert_eq!(max_mem.max, Some(4096));

        let overrides = TemplateOverrideExtractor.extract(&plugin).unwrap();
        assert_eq!(overrides[0].original, "postgres.yml");
        assert_eq!(
            overrides[0].replacement,
            Path::new("plugins").join("templates/postgres.yml")
        );
    }

    #[test]
    fn invalid_version_is_rejected() {
        let toml = r#"
[plugin]
name = "bad"
version = "one"
"#;
        let err = parse_plugin_manifest(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("invalid version"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let toml = r#"
[plugin]
name = ""
version = "0.1.0"
"#;
        let err = parse_plugin_manifest(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[plugin]
name = "typo"
version = "0.1.0"
descripton = "oops"
"#;
        assert!(parse_plugin_manifest(toml, Path::new(".")).is_err());
    }

    #[test]
    fn bad_category_fails_at_extraction() {
        let toml = r#"
[plugin]
name = "odd"
version = "0.1.0"

[[services]]
name = "thing"
category = "Spreadsheet"
"#;
        let plugin = parse_plugin_manifest(toml, Path::new(".")).unwrap();
        let err = ServiceExtractor.extract(&plugin).unwrap_err();
        assert!(matches!(
            err,
            DockyardError::Extraction { ref member, .. } if member == "thing"
        ));
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn duplicate_field_fails_at_extraction() {
        let toml = r#"
[plugin]
name = "dup"
version = "0.1.0"

[[services]]
name = "svc"
category = "Misc"

[[services.fields]]
key = "A"
type = "boolean"
default = true

[[services.fields]]
key = "A"
type = "boolean"
default = false
"#;
        let plugin = parse_plugin_manifest(toml, Path::new(".")).unwrap();
        let err = ServiceExtractor.extract(&plugin).unwrap_err();
        assert!(err.to_string().contains("already declared"));
    }

    #[test]
    fn bare_template_name_without_sibling_file_stays_a_reference() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_template(dir.path(), "postgres.yml"), "postgres.yml");
    }

    #[test]
    fn bare_names_resolve_next_to_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pg.yml"), "image: postgres:15\n").unwrap();
        std::fs::write(dir.path().join("echo.yml"), "image: echo\n").unwrap();
        let toml = r#"
[plugin]
name = "local"
version = "0.1.0"

[[services]]
name = "echo"
category = "misc"
template = "echo.yml"

[[overrides]]
template = "postgres.yml"
replacement = "pg.yml"
"#;
        let plugin = parse_plugin_manifest(toml, dir.path()).unwrap();

        let overrides = TemplateOverrideExtractor.extract(&plugin).unwrap();
        assert_eq!(overrides[0].replacement, dir.path().join("pg.yml"));
        assert!(overrides[0].replacement.is_file());

        let services = ServiceExtractor.extract(&plugin).unwrap();
        assert_eq!(
            PathBuf::from(services[0].template_ref()),
            dir.path().join("echo.yml")
        );
    }
}
