// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugins built from plain values for tests.

use std::sync::{Arc, Mutex};

use dockyard_core::{BoxError, DockyardError};
use dockyard_plugin::{
    CommandArtifact, CommandPlan, CommandStep, LifecycleEvent, LifecycleHandler, Plugin, Provides,
    ServiceDefinition, TemplateOverride,
};

/// Shared record of lifecycle handler calls, in call order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// A plugin assembled from ready-made artifacts.
///
/// Each artifact becomes one capability operation, in the order added.
#[derive(Clone)]
pub struct TestPlugin {
    name: String,
    version: semver::Version,
    services: Vec<ServiceDefinition>,
    overrides: Vec<TemplateOverride>,
    hooks: Vec<(String, LifecycleHandler)>,
    commands: Vec<CommandArtifact>,
}

impl TestPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: semver::Version::new(0, 0, 1),
            services: Vec::new(),
            overrides: Vec::new(),
            hooks: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_service(mut self, definition: ServiceDefinition) -> Self {
        self.services.push(definition);
        self
    }

    pub fn with_override(
        mut self,
        original: impl Into<String>,
        replacement: impl Into<std::path::PathBuf>,
    ) -> Self {
        self.overrides
            .push(TemplateOverride::new(original, replacement));
        self
    }

    /// Add a handler that appends `label` to `log` when called.
    pub fn with_recording_hook(
        mut self,
        event: LifecycleEvent,
        priority: i32,
        label: impl Into<String>,
        log: &CallLog,
    ) -> Self {
        let label = label.into();
        let log = Arc::clone(log);
        let recorded = label.clone();
        let handler = LifecycleHandler::new(event, priority, move |_ctx| {
            log.lock()
                .map_err(|_| "call log poisoned")?
                .push(recorded.clone());
            Ok(())
        });
        self.hooks.push((label, handler));
        self
    }

    /// Add a handler that always fails with `message`.
    pub fn with_failing_hook(mut self, event: LifecycleEvent, message: &'static str) -> Self {
        let handler = LifecycleHandler::new(event, 0, move |_ctx| Err(message.into()));
        self.hooks.push(("failing_hook".to_string(), handler));
        self
    }

    /// Add a command whose plan echoes its arguments.
    pub fn with_echo_command(mut self, name: impl Into<String>) -> Self {
        let command = CommandArtifact::new(name, "Echo arguments", |ctx| {
            let mut argv = vec!["echo".to_string()];
            argv.extend(ctx.args.iter().cloned());
            Ok(CommandPlan::single(CommandStep::new(argv)))
        });
        self.commands.push(command);
        self
    }
}

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        self.version.clone()
    }

    fn description(&self) -> &str {
        "test plugin"
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        self.services
            .iter()
            .cloned()
            .map(|def| Provides::new(def.name().to_string(), move || Ok::<_, BoxError>(def)))
            .collect()
    }

    fn commands(&self) -> Vec<Provides<CommandArtifact>> {
        self.commands
            .iter()
            .cloned()
            .map(|cmd| Provides::new(cmd.name.clone(), move || Ok::<_, BoxError>(cmd)))
            .collect()
    }

    fn lifecycle_handlers(&self) -> Vec<Provides<LifecycleHandler>> {
        self.hooks
            .iter()
            .cloned()
            .map(|(label, handler)| Provides::new(label, move || Ok::<_, BoxError>(handler)))
            .collect()
    }

    fn template_overrides(&self) -> Vec<Provides<TemplateOverride>> {
        self.overrides
            .iter()
            .cloned()
            .map(|o| Provides::new(o.original.clone(), move || Ok::<_, BoxError>(o)))
            .collect()
    }
}

/// A plugin whose service operation named `member` fails.
///
/// Declares a healthy `ok` service before the failing one, so tests can
/// check that no partial result leaks into the catalog.
pub struct FailingPlugin {
    name: String,
    member: String,
}

impl FailingPlugin {
    pub fn new(name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            member: member.into(),
        }
    }
}

impl Plugin for FailingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 1)
    }

    fn description(&self) -> &str {
        "plugin with a broken service operation"
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        let member = self.member.clone();
        vec![
            Provides::new("ok", || {
                ServiceDefinition::builder("ok", dockyard_core::ServiceCategory::Misc).build()
            }),
            Provides::new(member.clone(), move || {
                Err::<ServiceDefinition, _>(DockyardError::Internal(format!(
                    "{member} is broken"
                )))
            }),
        ]
    }
}
