// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin contract, capability extraction, and the plugin registry.
//!
//! Plugins contribute service definitions, commands, lifecycle handlers, and
//! template overrides. The registry extracts those artifacts, merges them
//! into a [`Catalog`] (later registrations win), and hands out immutable
//! snapshots of it.

pub mod builtin;
pub mod capability;
pub mod catalog;
pub mod extract;
pub mod manifest;
pub mod registry;
pub mod schema;
pub mod service;

pub use builtin::{bundled_plugins, bundled_template};
pub use capability::{
    CommandArtifact, CommandContext, CommandPlan, CommandStep, LifecycleContext, LifecycleEvent,
    LifecycleHandler, Plugin, Provides, TemplateOverride,
};
pub use catalog::{Catalog, ResolvedTemplate, ServiceEntry};
pub use extract::{
    extract_all, CapabilityExtractor, CommandExtractor, LifecycleExtractor, ServiceExtractor,
    TemplateOverrideExtractor,
};
pub use manifest::{load_plugin_manifest, parse_plugin_manifest, ManifestPlugin};
pub use registry::PluginRegistry;
pub use schema::{ConfigSchema, Field, FieldBuilder, FieldType, REDACTED};
pub use service::{DatabaseOps, HealthCheck, ServiceDefinition, ServiceDefinitionBuilder};
