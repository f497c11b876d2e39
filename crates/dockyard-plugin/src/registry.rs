// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry: assembles a consistent catalog from many plugins.
//!
//! Registration runs all four capability extractors and merges the results:
//!
//! - services and template overrides are keyed by name; a later
//!   registration with the same key **overrides** the earlier one (logged
//!   and recorded in the entry's `shadowed` list),
//! - commands are appended in registration order,
//! - lifecycle handlers are kept stable-sorted by descending priority, so
//!   ties run in registration order.
//!
//! Bundled plugins load first in their fixed order, then project plugins in
//! declared order, which keeps override behavior predictable.

use std::cmp::Reverse;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use dockyard_core::{DockyardError, PluginIdentity};
use tracing::{debug, info};

use crate::capability::{LifecycleContext, LifecycleEvent, Plugin};
use crate::catalog::{
    Catalog, CommandEntry, LifecycleEntry, ServiceEntry, TemplateOverrideEntry,
};
use crate::extract::extract_all;

/// Registry of plugins and the catalog they produce.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginIdentity>,
    catalog: Arc<Catalog>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from bundled plugins followed by project plugins.
    pub fn load<B, P>(bundled: B, project: P) -> Result<Self, DockyardError>
    where
        B: IntoIterator<Item = Box<dyn Plugin>>,
        P: IntoIterator<Item = Box<dyn Plugin>>,
    {
        let mut registry = Self::new();
        for plugin in bundled.into_iter().chain(project) {
            registry.register(plugin.as_ref())?;
        }
        Ok(registry)
    }

    /// Register a plugin and merge its artifacts into the catalog.
    ///
    /// Fails with `DuplicatePlugin` if the name is taken, or with
    /// `Extraction` if any capability operation fails. On failure the
    /// registry is left unchanged.
    pub fn register(&mut self, plugin: &dyn Plugin) -> Result<(), DockyardError> {
        let identity = plugin.identity();
        if self.get(&identity.name).is_some() {
            return Err(DockyardError::DuplicatePlugin {
                name: identity.name,
            });
        }

        let extracted = extract_all(plugin)?;
        let name = identity.name.clone();
        let catalog = Arc::make_mut(&mut self.catalog);

        for definition in extracted.services {
            match catalog.services.entry(definition.name().to_string()) {
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    info!(
                        service = definition.name(),
                        previous = %entry.plugin,
                        plugin = %name,
                        "service definition overridden by later plugin"
                    );
                    let previous = std::mem::replace(&mut entry.plugin, name.clone());
                    entry.shadowed.push(previous);
                    entry.definition = definition;
                }
                Entry::Vacant(slot) => {
                    slot.insert(ServiceEntry {
                        definition,
                        plugin: name.clone(),
                        shadowed: Vec::new(),
                    });
                }
            }
        }

        for command in extracted.commands {
            catalog.commands.push(CommandEntry {
                command,
                plugin: name.clone(),
            });
        }

        for handler in extracted.lifecycle {
            catalog.lifecycle.push(LifecycleEntry {
                handler,
                plugin: name.clone(),
            });
        }
        // Stable: equal priorities keep registration order.
        catalog
            .lifecycle
            .sort_by_key(|e| Reverse(e.handler.priority));

        for template_override in extracted.template_overrides {
            match catalog
                .template_overrides
                .entry(template_override.original.clone())
            {
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    info!(
                        template = %template_override.original,
                        previous = %entry.plugin,
                        plugin = %name,
                        "template override replaced by later plugin"
                    );
                    let previous = std::mem::replace(&mut entry.plugin, name.clone());
                    entry.shadowed.push(previous);
                    entry.template_override = template_override;
                }
                Entry::Vacant(slot) => {
                    slot.insert(TemplateOverrideEntry {
                        template_override,
                        plugin: name.clone(),
                        shadowed: Vec::new(),
                    });
                }
            }
        }

        debug!(plugin = %name, version = %identity.version, "registered plugin");
        self.plugins.push(identity);
        Ok(())
    }

    /// Get a registered plugin's identity by name.
    pub fn get(&self, name: &str) -> Option<&PluginIdentity> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Registered plugin identities, in registration order.
    pub fn plugins(&self) -> &[PluginIdentity] {
        &self.plugins
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Run every handler bound to `event`, highest priority first.
    ///
    /// Stops at the first failing handler.
    pub fn dispatch(
        &self,
        event: LifecycleEvent,
        ctx: &LifecycleContext<'_>,
    ) -> Result<(), DockyardError> {
        for entry in self.catalog.lifecycle_for(event) {
            debug!(%event, plugin = %entry.plugin, priority = entry.handler.priority, "running lifecycle handler");
            entry
                .handler
                .call(ctx)
                .map_err(|source| DockyardError::Lifecycle {
                    event: event.to_string(),
                    plugin: entry.plugin.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
