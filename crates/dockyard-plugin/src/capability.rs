// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plugin contract and the capability artifacts a plugin can contribute.
//!
//! A plugin is any type implementing [`Plugin`]. Besides its identity, it
//! enumerates capability-declared operations through four optional methods,
//! one per artifact kind. Each operation is a [`Provides`] value: a member
//! name plus a constructor the extractors invoke exactly once.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dockyard_core::{BoxError, Configuration, PluginIdentity};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::catalog::Catalog;
use crate::service::ServiceDefinition;

/// A capability-declared operation yielding one artifact of type `T`.
pub struct Provides<T> {
    member: String,
    provide: Box<dyn FnOnce() -> Result<T, BoxError> + Send>,
}

impl<T> Provides<T> {
    /// Declare an operation named `member` that builds its artifact with `provide`.
    pub fn new<F, E>(member: impl Into<String>, provide: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            member: member.into(),
            provide: Box::new(move || provide().map_err(Into::into)),
        }
    }

    /// Name of the declaring member, used in extraction errors.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Invoke the operation.
    pub fn invoke(self) -> Result<T, BoxError> {
        (self.provide)()
    }
}

impl<T> fmt::Debug for Provides<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provides")
            .field("member", &self.member)
            .finish_non_exhaustive()
    }
}

/// An independently authored unit of identity plus declared capabilities.
///
/// The capability methods default to empty, so a plugin only overrides the
/// kinds it contributes. Operations are reported in declaration order.
pub trait Plugin: Send + Sync {
    /// Globally unique plugin name.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn description(&self) -> &str;

    /// Dependency declarations. Carried through but not interpreted.
    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    fn identity(&self) -> PluginIdentity {
        PluginIdentity {
            name: self.name().to_string(),
            version: self.version(),
            description: self.description().to_string(),
            requires: self.requires(),
        }
    }

    fn services(&self) -> Vec<Provides<ServiceDefinition>> {
        Vec::new()
    }

    fn commands(&self) -> Vec<Provides<CommandArtifact>> {
        Vec::new()
    }

    fn lifecycle_handlers(&self) -> Vec<Provides<LifecycleHandler>> {
        Vec::new()
    }

    fn template_overrides(&self) -> Vec<Provides<TemplateOverride>> {
        Vec::new()
    }
}

/// One step of a command plan, run by an external executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStep {
    pub argv: Vec<String>,
    /// File to feed to the process on stdin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin_from: Option<PathBuf>,
    /// File to write the process's stdout to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_to: Option<PathBuf>,
}

impl CommandStep {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            stdin_from: None,
            stdout_to: None,
        }
    }

    /// Render as a shell-like line for display.
    pub fn display_line(&self) -> String {
        let mut line = self.argv.join(" ");
        if let Some(input) = &self.stdin_from {
            line.push_str(&format!(" < {}", input.display()));
        }
        if let Some(output) = &self.stdout_to {
            line.push_str(&format!(" > {}", output.display()));
        }
        line
    }
}

/// Ordered process invocations a plugin command wants executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPlan {
    pub steps: Vec<CommandStep>,
}

impl CommandPlan {
    pub fn single(step: CommandStep) -> Self {
        Self { steps: vec![step] }
    }
}

/// Inputs available to a plugin command.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub configuration: &'a Configuration,
    pub catalog: &'a Catalog,
    pub args: &'a [String],
}

type CommandHandler = Arc<dyn for<'a> Fn(&CommandContext<'a>) -> Result<CommandPlan, BoxError> + Send + Sync>;

/// A CLI command contributed by a plugin.
#[derive(Clone)]
pub struct CommandArtifact {
    pub name: String,
    pub description: String,
    pub usage: String,
    handler: CommandHandler,
}

impl CommandArtifact {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&CommandContext<'a>) -> Result<CommandPlan, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            usage: name.clone(),
            name,
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Build the command plan for `ctx`.
    pub fn plan(&self, ctx: &CommandContext<'_>) -> Result<CommandPlan, BoxError> {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for CommandArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandArtifact")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Points in a project's workflow where lifecycle handlers run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEvent {
    BeforeGenerate,
    AfterGenerate,
    BeforeStart,
    AfterStart,
    BeforeStop,
    AfterStop,
}

/// Inputs available to a lifecycle handler.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleContext<'a> {
    pub configuration: &'a Configuration,
    /// Generated manifest text, present for `AfterGenerate`.
    pub manifest: Option<&'a str>,
}

type HookFn = Arc<dyn for<'a> Fn(&LifecycleContext<'a>) -> Result<(), BoxError> + Send + Sync>;

/// A handler bound to a lifecycle event. Higher priority runs first.
#[derive(Clone)]
pub struct LifecycleHandler {
    pub event: LifecycleEvent,
    pub priority: i32,
    handler: HookFn,
}

impl LifecycleHandler {
    pub fn new<F>(event: LifecycleEvent, priority: i32, handler: F) -> Self
    where
        F: for<'a> Fn(&LifecycleContext<'a>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            event,
            priority,
            handler: Arc::new(handler),
        }
    }

    pub fn call(&self, ctx: &LifecycleContext<'_>) -> Result<(), BoxError> {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for LifecycleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHandler")
            .field("event", &self.event)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Replaces a bundled template with a project-provided file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOverride {
    /// Template reference being replaced, e.g. `postgres.yml`.
    pub original: String,
    /// Path of the replacement template.
    pub replacement: PathBuf,
}

impl TemplateOverride {
    pub fn new(original: impl Into<String>, replacement: impl Into<PathBuf>) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provides_invokes_once_and_keeps_member_name() {
        let op = Provides::new("answer", || Ok::<_, BoxError>(42));
        assert_eq!(op.member(), "answer");
        assert_eq!(op.invoke().unwrap(), 42);
    }

    #[test]
    fn provides_surfaces_errors() {
        let op: Provides<u8> = Provides::new("broken", || Err::<u8, _>("boom"));
        assert_eq!(op.invoke().unwrap_err().to_string(), "boom");
    }

    #[test]
    fn lifecycle_events_use_kebab_case() {
        assert_eq!(LifecycleEvent::BeforeGenerate.to_string(), "before-generate");
        assert_eq!(
            LifecycleEvent::from_str("after-stop").unwrap(),
            LifecycleEvent::AfterStop
        );
    }

    #[test]
    fn command_step_display_includes_redirects() {
        let mut step = CommandStep::new(vec!["pg_dump".into(), "app".into()]);
        step.stdout_to = Some(PathBuf::from("dump.sql"));
        assert_eq!(step.display_line(), "pg_dump app > dump.sql");
    }

    struct Bare;

    impl Plugin for Bare {
        fn name(&self) -> &str {
            "bare"
        }

        fn version(&self) -> semver::Version {
            semver::Version::new(1, 2, 3)
        }

        fn description(&self) -> &str {
            "no capabilities"
        }
    }

    #[test]
    fn plugin_capabilities_default_to_empty() {
        let plugin = Bare;
        assert!(plugin.services().is_empty());
        assert!(plugin.commands().is_empty());
        assert!(plugin.lifecycle_handlers().is_empty());
        assert!(plugin.template_overrides().is_empty());

        let identity = plugin.identity();
        assert_eq!(identity.name, "bare");
        assert_eq!(identity.version.to_string(), "1.2.3");
        assert!(identity.requires.is_empty());
    }
}
