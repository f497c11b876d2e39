// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for project file loading and diagnostics.

use std::fs;
use std::path::PathBuf;

use dockyard_config::diagnostic::{suggest_key, ConfigError};
use dockyard_config::{
    load_and_validate_from_path, load_and_validate_str, load_config_from_str, DockyardConfig,
};
use serde_json::json;

const SHOP: &str = r#"
[project]
name = "shop"
domain = "test"
tls = true
port_window = 20
output = "compose/dev.yml"

[[services]]
name = "postgres"
ports = [15432]

[services.config]
POSTGRES_DB = "orders"

[[services]]
name = "redis"

[plugins]
paths = ["plugins/redis-stack.toml"]
templates_dir = "templates"
"#;

#[test]
fn full_project_file_deserializes() {
    let config = load_config_from_str(SHOP).expect("valid TOML should deserialize");
    assert_eq!(config.project.name, "shop");
    assert_eq!(config.project.domain, "test");
    assert!(config.project.tls);
    assert!(config.project.proxy);
    assert_eq!(config.project.port_window, 20);
    assert_eq!(config.project.output, PathBuf::from("compose/dev.yml"));
    assert_eq!(config.service_names(), vec!["postgres", "redis"]);
    assert_eq!(config.services[0].config["POSTGRES_DB"], json!("orders"));
    assert_eq!(
        config.plugins.paths,
        vec![PathBuf::from("plugins/redis-stack.toml")]
    );
    assert_eq!(config.plugins.templates_dir, Some(PathBuf::from("templates")));
}

#[test]
fn empty_file_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config, DockyardConfig::default());
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[logging]\nlevel = \"debug\"\n")
        .expect_err("unknown section should be rejected");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_key_suggests_correction() {
    let errors = load_and_validate_str("[project]\nnmae = \"shop\"\n")
        .expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "nmae"
                && suggestion.as_deref() == Some("name")
                && valid_keys.contains("port_window")
        })
    });
    assert!(found, "expected UnknownKey for `nmae`, got: {errors:?}");
}

#[test]
fn unknown_key_in_services_suggests_correction() {
    let toml = r#"
[[services]]
name = "redis"
confg = { version = "7" }
"#;
    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion, .. }
            if key == "confg" && suggestion.as_deref() == Some("config")
    )));
}

#[test]
fn invalid_type_is_reported() {
    let errors = load_and_validate_str("[project]\nport_window = \"ten\"\n")
        .expect_err("should reject invalid type");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::InvalidType { key, .. } if key.contains("port_window")
    )));
}

#[test]
fn validation_errors_surface_through_loader() {
    let toml = r#"
[project]
name = "Shop"

[[services]]
name = "redis"

[[services]]
name = "redis"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn project_file_on_disk_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dockyard.toml");
    fs::write(&path, SHOP).unwrap();

    let config = load_and_validate_from_path(&path).expect("file should validate");
    assert_eq!(config.project.name, "shop");
}

#[test]
fn unknown_key_on_disk_gets_a_source_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dockyard.toml");
    fs::write(&path, "[project]\nname = \"shop\"\ndomian = \"test\"\n").unwrap();

    let errors = load_and_validate_from_path(&path).expect_err("should fail");
    let Some(ConfigError::UnknownKey { span, suggestion, .. }) = errors.first() else {
        panic!("expected UnknownKey, got: {errors:?}");
    };
    assert_eq!(suggestion.as_deref(), Some("domain"));
    assert!(span.is_some());
}

#[test]
fn distant_typo_has_no_suggestion() {
    assert!(suggest_key("zzzzzz", &["name", "domain", "tls"]).is_none());
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "nmae".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, domain".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `name`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("nmae"));
}
