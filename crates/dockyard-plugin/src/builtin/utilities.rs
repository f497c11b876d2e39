// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bundled developer utilities: Mailpit, Adminer, and the Traefik proxy.

use dockyard_core::{BoxError, DockyardError, ServiceCategory};
use serde_json::json;
use tracing::{info, warn};

use crate::capability::{LifecycleContext, LifecycleEvent, LifecycleHandler, Plugin, Provides};
use crate::schema::{ConfigSchema, FieldType};
use crate::service::{HealthCheck, ServiceDefinition};

use super::BUNDLED_VERSION;

/// Plugin providing utility services and proxy-related lifecycle hooks.
pub struct UtilitiesPlugin;

impl Plugin for UtilitiesPlugin {
    fn name(&self) -> &str {
        "utilities"
    }

    fn version(&self) -> semver::Version {
        BUNDLED_VERSION
    }

    fn description(&self) -> &str {
        "Mail catcher, database UI, and reverse proxy"
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        vec![
            Provides::new("mailpit", mailpit),
            Provides::new("adminer", adminer),
            Provides::new("traefik", traefik),
        ]
    }

    fn lifecycle_handlers(&self) -> Vec<Provides<LifecycleHandler>> {
        vec![
            Provides::new("check_adminer_targets", || {
                Ok::<_, BoxError>(LifecycleHandler::new(
                    LifecycleEvent::BeforeGenerate,
                    0,
                    check_adminer_targets,
                ))
            }),
            Provides::new("report_routes", || {
                Ok::<_, BoxError>(LifecycleHandler::new(
                    LifecycleEvent::AfterGenerate,
                    -100,
                    report_routes,
                ))
            }),
        ]
    }
}

fn mailpit() -> Result<ServiceDefinition, DockyardError> {
    ServiceDefinition::builder("mailpit", ServiceCategory::Utility)
        .display_name("Mailpit")
        .description("Email testing tool with web UI and SMTP server")
        .icon("📬")
        .port(8025, 8025)
        .port(1025, 1025)
        .http()
        .default_value("version", "latest")
        .build()
}

fn adminer() -> Result<ServiceDefinition, DockyardError> {
    let mut schema = ConfigSchema::new();
    schema
        .field("ADMINER_DESIGN", FieldType::String, json!("pepa-linha"))
        .one_of(["pepa-linha", "dracula", "nette", "hever"])
        .label("Theme")
        .finish()?;
    schema
        .field("ADMINER_DEFAULT_SERVER", FieldType::String, json!("postgres"))
        .label("Default server")
        .description("Service name Adminer connects to by default")
        .finish()?;

    ServiceDefinition::builder("adminer", ServiceCategory::Utility)
        .display_name("Adminer")
        .description("Database management in a single web page")
        .icon("🗄")
        .port(8080, 8080)
        .http()
        .default_value("version", "latest")
        .schema(schema)
        .build()
}

fn traefik() -> Result<ServiceDefinition, DockyardError> {
    // Dashboard first; templates reference web/websecure as ports 1 and 2.
    ServiceDefinition::builder("traefik", ServiceCategory::Utility)
        .display_name("Traefik")
        .description("Reverse proxy routing *.localhost hosts to services")
        .icon("🚦")
        .port(8081, 8080)
        .port(80, 80)
        .port(443, 443)
        .http()
        .default_value("version", "v3.1")
        .health_check(HealthCheck::cmd(["traefik", "healthcheck", "--ping"]))
        .build()
}

fn check_adminer_targets(ctx: &LifecycleContext<'_>) -> Result<(), BoxError> {
    let config = ctx.configuration;
    if config.service("adminer").is_some()
        && !config
            .services
            .iter()
            .any(|s| s.category == ServiceCategory::Database && s.name != "sqlite")
    {
        warn!(project = %config.project, "adminer is selected without a networked database service");
    }
    Ok(())
}

fn report_routes(ctx: &LifecycleContext<'_>) -> Result<(), BoxError> {
    let Some(manifest) = ctx.manifest else {
        return Ok(());
    };
    let routes = manifest
        .lines()
        .filter(|l| l.contains("traefik.http.routers.") && l.contains(".rule"))
        .count();
    if routes > 0 {
        info!(project = %ctx.configuration.project, routes, "reverse proxy routes generated");
    }
    Ok(())
}
