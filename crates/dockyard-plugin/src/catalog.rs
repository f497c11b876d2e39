// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only catalog snapshots assembled by the plugin registry.

use std::collections::BTreeMap;
use std::path::Path;

use dockyard_core::ServiceCategory;

use crate::capability::{CommandArtifact, LifecycleEvent, LifecycleHandler, TemplateOverride};
use crate::service::ServiceDefinition;

/// Minimum Jaro-Winkler similarity for "did you mean" suggestions.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A service definition and the plugin that provided it.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    pub definition: ServiceDefinition,
    /// Plugin whose definition is active.
    pub plugin: String,
    /// Plugins whose definitions of the same name were overridden, oldest first.
    pub shadowed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub command: CommandArtifact,
    pub plugin: String,
}

#[derive(Debug, Clone)]
pub struct LifecycleEntry {
    pub handler: LifecycleHandler,
    pub plugin: String,
}

#[derive(Debug, Clone)]
pub struct TemplateOverrideEntry {
    pub template_override: TemplateOverride,
    pub plugin: String,
    pub shadowed: Vec<String>,
}

/// Merged view of every artifact contributed by registered plugins.
///
/// Obtained from [`crate::PluginRegistry::catalog`]. A snapshot never
/// changes after it is handed out; later registrations produce a new one.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) services: BTreeMap<String, ServiceEntry>,
    pub(crate) commands: Vec<CommandEntry>,
    pub(crate) lifecycle: Vec<LifecycleEntry>,
    pub(crate) template_overrides: BTreeMap<String, TemplateOverrideEntry>,
}

impl Catalog {
    /// Look up an active service definition by name.
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.get(name).map(|e| &e.definition)
    }

    pub fn service_entry(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }

    /// All service entries, sorted by name.
    pub fn services(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.services.values()
    }

    /// Service entries in `category`, sorted by name.
    pub fn services_in(&self, category: ServiceCategory) -> Vec<&ServiceEntry> {
        self.services
            .values()
            .filter(|e| e.definition.category() == category)
            .collect()
    }

    /// Closest known service name to `unknown`, if any is close enough.
    pub fn suggest_service(&self, unknown: &str) -> Option<String> {
        let mut best_score = SUGGESTION_THRESHOLD;
        let mut best_match = None;
        for name in self.services.keys() {
            let score = strsim::jaro_winkler(unknown, name);
            if score > best_score {
                best_score = score;
                best_match = Some(name.clone());
            }
        }
        best_match
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Look up a plugin command by name.
    pub fn command(&self, name: &str) -> Option<&CommandArtifact> {
        self.commands
            .iter()
            .find(|e| e.command.name == name)
            .map(|e| &e.command)
    }

    /// Commands in registration order.
    pub fn commands(&self) -> &[CommandEntry] {
        &self.commands
    }

    /// All lifecycle handlers, highest priority first.
    pub fn lifecycle(&self) -> &[LifecycleEntry] {
        &self.lifecycle
    }

    /// Handlers bound to `event`, in execution order.
    pub fn lifecycle_for(&self, event: LifecycleEvent) -> impl Iterator<Item = &LifecycleEntry> {
        self.lifecycle
            .iter()
            .filter(move |e| e.handler.event == event)
    }

    /// Active override for a template reference.
    pub fn template_override(&self, original: &str) -> Option<&TemplateOverride> {
        self.template_overrides
            .get(original)
            .map(|e| &e.template_override)
    }

    pub fn template_overrides(&self) -> impl Iterator<Item = &TemplateOverrideEntry> {
        self.template_overrides.values()
    }

    /// Template a service should be rendered from, after overrides.
    pub fn resolve_template<'a>(&'a self, definition: &'a ServiceDefinition) -> ResolvedTemplate<'a> {
        match self.template_override(definition.template_ref()) {
            Some(o) => ResolvedTemplate::Override(&o.replacement),
            None => ResolvedTemplate::Bundled(definition.template_ref()),
        }
    }
}

/// Where a service's template comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTemplate<'a> {
    /// A template reference looked up in the template store.
    Bundled(&'a str),
    /// A project-provided replacement file.
    Override(&'a Path),
}

impl ResolvedTemplate<'_> {
    /// Display form of the template location, used in render errors.
    pub fn display(&self) -> String {
        match self {
            ResolvedTemplate::Bundled(name) => (*name).to_string(),
            ResolvedTemplate::Override(path) => path.display().to_string(),
        }
    }
}
