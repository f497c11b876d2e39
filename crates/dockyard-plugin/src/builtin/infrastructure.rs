// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bundled cache, queue, search, and object storage services.

use std::time::Duration;

use dockyard_core::{DockyardError, ServiceCategory};
use serde_json::json;

use crate::capability::{Plugin, Provides};
use crate::schema::{ConfigSchema, FieldType};
use crate::service::{HealthCheck, ServiceDefinition};

use super::BUNDLED_VERSION;

/// Plugin providing Redis, RabbitMQ, Meilisearch, and MinIO.
pub struct InfrastructurePlugin;

impl Plugin for InfrastructurePlugin {
    fn name(&self) -> &str {
        "infrastructure"
    }

    fn version(&self) -> semver::Version {
        BUNDLED_VERSION
    }

    fn description(&self) -> &str {
        "Cache, queue, search, and object storage services"
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        vec![
            Provides::new("redis", redis),
            Provides::new("rabbitmq", rabbitmq),
            Provides::new("meilisearch", meilisearch),
            Provides::new("minio", minio),
        ]
    }
}

fn redis() -> Result<ServiceDefinition, DockyardError> {
    ServiceDefinition::builder("redis", ServiceCategory::Cache)
        .display_name("Redis")
        .description("In-memory key-value store")
        .icon("🟥")
        .port(6379, 6379)
        .default_value("version", "7")
        .health_check(HealthCheck::cmd(["redis-cli", "ping"]).with_interval(Duration::from_secs(5)))
        .build()
}

fn rabbitmq() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("RABBITMQ_DEFAULT_USER", FieldType::String, json!("guest"))
        .label("User")
        .finish()?;
    schema
        .field("RABBITMQ_DEFAULT_PASS", FieldType::String, json!("guest"))
        .label("Password")
        .secret()
        .finish()?;

    // Management UI first so the reverse proxy routes to it.
    ServiceDefinition::builder("rabbitmq", ServiceCategory::Queue)
        .display_name("RabbitMQ")
        .description("Message broker with management UI")
        .icon("🐇")
        .port(15672, 15672)
        .port(5672, 5672)
        .http()
        .default_value("version", "3.13")
        .health_check(
            HealthCheck::cmd(["rabbitmq-diagnostics", "-q", "ping"])
                .with_interval(Duration::from_secs(30))
                .with_timeout(Duration::from_secs(10)),
        )
        .schema(schema)
        .build()
}

fn meilisearch() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("MEILI_MASTER_KEY", FieldType::String, json!("masterKey"))
        .label("Master key")
        .secret()
        .finish()?;
    schema
        .field("MEILI_ENV", FieldType::String, json!("development"))
        .one_of(["development", "production"])
        .label("Environment")
        .finish()?;
    schema
        .field("MEILI_NO_ANALYTICS", FieldType::Boolean, json!(true))
        .label("Disable analytics")
        .finish()?;

    ServiceDefinition::builder("meilisearch", ServiceCategory::Search)
        .display_name("Meilisearch")
        .description("Lightning-fast full-text search engine")
        .icon("🔎")
        .port(7700, 7700)
        .http()
        .default_value("version", "v1.10")
        .health_check(HealthCheck::cmd([
            "curl",
            "-f",
            "http://localhost:7700/health",
        ]))
        .schema(schema)
        .build()
}

fn minio() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("MINIO_ROOT_USER", FieldType::String, json!("dockyard"))
        .label("Root user")
        .finish()?;
    schema
        .field("MINIO_ROOT_PASSWORD", FieldType::String, json!("dockyard-secret"))
        .label("Root password")
        .secret()
        .finish()?;

    // Console first so the reverse proxy routes to it.
    ServiceDefinition::builder("minio", ServiceCategory::Storage)
        .display_name("MinIO")
        .description("S3-compatible object storage")
        .icon("🪣")
        .port(9001, 9001)
        .port(9000, 9000)
        .http()
        .default_value("version", "latest")
        .health_check(HealthCheck::cmd(["mc", "ready", "local"]))
        .schema(schema)
        .build()
}
