// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bundled relational databases: PostgreSQL, MySQL, and SQLite.

use dockyard_core::{ConfigMap, DockyardError, ServiceCategory};
use serde_json::json;

use crate::capability::{Plugin, Provides};
use crate::schema::{ConfigSchema, FieldType};
use crate::service::{DatabaseOps, HealthCheck, ServiceDefinition};

use super::{config_str, BUNDLED_VERSION};

/// Plugin providing the bundled database services.
pub struct DatabasesPlugin;

impl Plugin for DatabasesPlugin {
    fn name(&self) -> &str {
        "databases"
    }

    fn version(&self) -> semver::Version {
        BUNDLED_VERSION
    }

    fn description(&self) -> &str {
        "PostgreSQL, MySQL, and SQLite database services"
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        vec![
            Provides::new("postgres", postgres),
            Provides::new("mysql", mysql),
            Provides::new("sqlite", sqlite),
        ]
    }
}

fn postgres() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("POSTGRES_USER", FieldType::String, json!("dockyard"))
        .label("User")
        .finish()?;
    schema
        .field("POSTGRES_PASSWORD", FieldType::String, json!("dockyard"))
        .label("Password")
        .secret()
        .finish()?;
    schema
        .field("POSTGRES_DB", FieldType::String, json!("dockyard"))
        .label("Database")
        .description("Database created on first start")
        .finish()?;

    ServiceDefinition::builder("postgres", ServiceCategory::Database)
        .display_name("PostgreSQL")
        .description("The world's most advanced open source relational database")
        .icon("🐘")
        .port(5432, 5432)
        .default_value("version", "16")
        .health_check(HealthCheck::shell("pg_isready -U \"$$POSTGRES_USER\""))
        .database_ops(DatabaseOps::new(
            |c: &ConfigMap| {
                argv(&[
                    "pg_dump",
                    "-U",
                    &config_str(c, "POSTGRES_USER"),
                    "-d",
                    &config_str(c, "POSTGRES_DB"),
                ])
            },
            |c: &ConfigMap| {
                argv(&[
                    "psql",
                    "-U",
                    &config_str(c, "POSTGRES_USER"),
                    "-d",
                    &config_str(c, "POSTGRES_DB"),
                ])
            },
            |c: &ConfigMap| {
                argv(&[
                    "psql",
                    "-U",
                    &config_str(c, "POSTGRES_USER"),
                    "-d",
                    &config_str(c, "POSTGRES_DB"),
                ])
            },
        ))
        .schema(schema)
        .build()
}

fn mysql() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("MYSQL_ROOT_PASSWORD", FieldType::String, json!("root"))
        .label("Root password")
        .secret()
        .finish()?;
    schema
        .field("MYSQL_DATABASE", FieldType::String, json!("dockyard"))
        .label("Database")
        .finish()?;
    schema
        .field("MYSQL_USER", FieldType::String, json!("dockyard"))
        .label("User")
        .finish()?;
    schema
        .field("MYSQL_PASSWORD", FieldType::String, json!("dockyard"))
        .label("Password")
        .secret()
        .finish()?;

    ServiceDefinition::builder("mysql", ServiceCategory::Database)
        .display_name("MySQL")
        .description("Popular open source relational database")
        .icon("🐬")
        .port(3306, 3306)
        .default_value("version", "8.4")
        .health_check(HealthCheck::cmd(["mysqladmin", "ping", "-h", "localhost"]))
        .database_ops(DatabaseOps::new(
            |c: &ConfigMap| {
                let password = format!("-p{}", config_str(c, "MYSQL_ROOT_PASSWORD"));
                argv(&["mysqldump", "-uroot", &password, &config_str(c, "MYSQL_DATABASE")])
            },
            |c: &ConfigMap| {
                let password = format!("-p{}", config_str(c, "MYSQL_ROOT_PASSWORD"));
                argv(&["mysql", "-uroot", &password, &config_str(c, "MYSQL_DATABASE")])
            },
            |c: &ConfigMap| {
                let user = format!("-u{}", config_str(c, "MYSQL_USER"));
                let password = format!("-p{}", config_str(c, "MYSQL_PASSWORD"));
                argv(&["mysql", &user, &password, &config_str(c, "MYSQL_DATABASE")])
            },
        ))
        .schema(schema)
        .build()
}

fn sqlite() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("SQLITE_DATABASE", FieldType::String, json!("database.sqlite"))
        .label("Database file")
        .description("File name inside the data directory")
        .finish()?;

    // File-based: no network exposure, so no ports.
    ServiceDefinition::builder("sqlite", ServiceCategory::Database)
        .display_name("SQLite")
        .description("File-based embedded database with a CLI container")
        .icon("🪶")
        .default_value("version", "latest")
        .default_value("data_dir", "data")
        .database_ops(DatabaseOps::new(
            |c: &ConfigMap| argv(&["sqlite3", &sqlite_path(c), ".dump"]),
            |c: &ConfigMap| argv(&["sqlite3", &sqlite_path(c)]),
            |c: &ConfigMap| argv(&["sqlite3", &sqlite_path(c)]),
        ))
        .schema(schema)
        .build()
}

fn sqlite_path(config: &ConfigMap) -> String {
    format!("/data/{}", config_str(config, "SQLITE_DATABASE"))
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_dump_uses_resolved_credentials() {
        let def = postgres().unwrap();
        let mut env = def.schema().unwrap().defaults();
        env.insert("POSTGRES_DB".into(), json!("shop"));
        let config = def.merged_config(&env);
        let ops = def.database_ops().unwrap();
        assert_eq!(
            (ops.dump)(&config),
            vec!["pg_dump", "-U", "dockyard", "-d", "shop"]
        );
    }

    #[test]
    fn sqlite_has_no_ports() {
        let def = sqlite().unwrap();
        assert!(def.ports().is_empty());
        assert!(def.internal_ports().is_empty());
        let config = def.merged_config(&def.schema().unwrap().defaults());
        assert_eq!(
            (def.database_ops().unwrap().shell)(&config),
            vec!["sqlite3", "/data/database.sqlite"]
        );
    }

    #[test]
    fn mysql_secrets_are_flagged() {
        let def = mysql().unwrap();
        let schema = def.schema().unwrap();
        assert!(schema.get("MYSQL_ROOT_PASSWORD").unwrap().secret);
        assert!(!schema.get("MYSQL_USER").unwrap().secret);
    }
}
