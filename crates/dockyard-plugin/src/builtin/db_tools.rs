// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database maintenance commands built on services' database operations.
//!
//! Each command resolves the target service's config and wraps its dump,
//! restore, or shell command in a `docker compose exec` invocation.

use std::path::PathBuf;

use dockyard_core::BoxError;

use crate::capability::{CommandArtifact, CommandContext, CommandPlan, CommandStep, Plugin, Provides};
use crate::service::{CommandBuilder, DatabaseOps};

use super::BUNDLED_VERSION;

/// Plugin providing `db:dump`, `db:restore`, and `db:shell`.
pub struct DbToolsPlugin;

impl Plugin for DbToolsPlugin {
    fn name(&self) -> &str {
        "db-tools"
    }

    fn version(&self) -> semver::Version {
        BUNDLED_VERSION
    }

    fn description(&self) -> &str {
        "Dump, restore, and open shells on database services"
    }

    fn commands(&self) -> Vec<Provides<CommandArtifact>> {
        vec![
            Provides::new("dump", || {
                Ok::<_, BoxError>(
                    CommandArtifact::new("db:dump", "Dump a database to a file", dump)
                        .with_usage("db:dump <service> [file]"),
                )
            }),
            Provides::new("restore", || {
                Ok::<_, BoxError>(
                    CommandArtifact::new("db:restore", "Restore a database from a file", restore)
                        .with_usage("db:restore <service> <file>"),
                )
            }),
            Provides::new("shell", || {
                Ok::<_, BoxError>(
                    CommandArtifact::new("db:shell", "Open an interactive database shell", shell)
                        .with_usage("db:shell <service>"),
                )
            }),
        ]
    }
}

fn dump(ctx: &CommandContext<'_>) -> Result<CommandPlan, BoxError> {
    let service = target(ctx)?;
    let default_file = format!("{service}.sql");
    let file = ctx.args.get(1).map(String::as_str).unwrap_or(&default_file);
    let mut step = exec_step(ctx, service, false, |ops| &ops.dump)?;
    step.stdout_to = Some(PathBuf::from(file));
    Ok(CommandPlan::single(step))
}

fn restore(ctx: &CommandContext<'_>) -> Result<CommandPlan, BoxError> {
    let service = target(ctx)?;
    let file = ctx
        .args
        .get(1)
        .ok_or("db:restore needs a file to restore from")?;
    let mut step = exec_step(ctx, service, false, |ops| &ops.restore)?;
    step.stdin_from = Some(PathBuf::from(file));
    Ok(CommandPlan::single(step))
}

fn shell(ctx: &CommandContext<'_>) -> Result<CommandPlan, BoxError> {
    let service = target(ctx)?;
    Ok(CommandPlan::single(exec_step(ctx, service, true, |ops| &ops.shell)?))
}

fn target<'a>(ctx: &CommandContext<'a>) -> Result<&'a str, BoxError> {
    ctx.args
        .first()
        .map(String::as_str)
        .ok_or_else(|| "missing service name".into())
}

fn exec_step(
    ctx: &CommandContext<'_>,
    service: &str,
    interactive: bool,
    pick: impl Fn(&DatabaseOps) -> &CommandBuilder,
) -> Result<CommandStep, BoxError> {
    let selected = ctx
        .configuration
        .service(service)
        .ok_or_else(|| format!("service `{service}` is not part of project `{}`", ctx.configuration.project))?;
    let definition = ctx
        .catalog
        .service(service)
        .ok_or_else(|| format!("service `{service}` is not in the catalog"))?;
    let ops = definition
        .database_ops()
        .ok_or_else(|| format!("service `{service}` has no database operations"))?;

    let config = definition.merged_config(&selected.environment);
    let mut argv: Vec<String> = vec![
        "docker".into(),
        "compose".into(),
        "-p".into(),
        ctx.configuration.project.clone(),
        "exec".into(),
    ];
    if !interactive {
        argv.push("-T".into());
    }
    argv.push(service.to_string());
    argv.extend(pick(ops)(&config));
    Ok(CommandStep::new(argv))
}
