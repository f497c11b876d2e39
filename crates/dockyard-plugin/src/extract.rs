// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability extractors.
//!
//! Each extractor harvests one artifact kind from a plugin by invoking every
//! operation the plugin declares for that kind, in declaration order. The
//! first failing operation aborts extraction for the plugin; no partial
//! artifact list is returned.

use dockyard_core::DockyardError;
use tracing::debug;

use crate::capability::{
    CommandArtifact, LifecycleHandler, Plugin, Provides, TemplateOverride,
};
use crate::service::ServiceDefinition;

/// Stateless harvester for one capability kind.
pub trait CapabilityExtractor {
    type Artifact;

    /// Short name of the capability kind, used in logs.
    fn kind(&self) -> &'static str;

    /// The plugin's declared operations of this kind.
    fn declared(&self, plugin: &dyn Plugin) -> Vec<Provides<Self::Artifact>>;

    /// Invoke every declared operation and collect the artifacts.
    fn extract(&self, plugin: &dyn Plugin) -> Result<Vec<Self::Artifact>, DockyardError> {
        let declared = self.declared(plugin);
        let mut artifacts = Vec::with_capacity(declared.len());
        for op in declared {
            let member = op.member().to_string();
            let artifact = op.invoke().map_err(|source| DockyardError::Extraction {
                plugin: plugin.name().to_string(),
                member: member.clone(),
                source,
            })?;
            debug!(plugin = plugin.name(), kind = self.kind(), %member, "extracted capability");
            artifacts.push(artifact);
        }
        Ok(artifacts)
    }
}

/// Harvests [`ServiceDefinition`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceExtractor;

impl CapabilityExtractor for ServiceExtractor {
    type Artifact = ServiceDefinition;

    fn kind(&self) -> &'static str {
        "service"
    }

    fn declared(&self, plugin: &dyn Plugin) -> Vec<Provides<ServiceDefinition>> {
        plugin.services()
    }
}

/// Harvests [`CommandArtifact`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExtractor;

impl CapabilityExtractor for CommandExtractor {
    type Artifact = CommandArtifact;

    fn kind(&self) -> &'static str {
        "command"
    }

    fn declared(&self, plugin: &dyn Plugin) -> Vec<Provides<CommandArtifact>> {
        plugin.commands()
    }
}

/// Harvests [`LifecycleHandler`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleExtractor;

impl CapabilityExtractor for LifecycleExtractor {
    type Artifact = LifecycleHandler;

    fn kind(&self) -> &'static str {
        "lifecycle"
    }

    fn declared(&self, plugin: &dyn Plugin) -> Vec<Provides<LifecycleHandler>> {
        plugin.lifecycle_handlers()
    }
}

/// Harvests [`TemplateOverride`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateOverrideExtractor;

impl CapabilityExtractor for TemplateOverrideExtractor {
    type Artifact = TemplateOverride;

    fn kind(&self) -> &'static str {
        "template-override"
    }

    fn declared(&self, plugin: &dyn Plugin) -> Vec<Provides<TemplateOverride>> {
        plugin.template_overrides()
    }
}

/// Everything one plugin contributes.
#[derive(Debug)]
pub struct Extracted {
    pub services: Vec<ServiceDefinition>,
    pub commands: Vec<CommandArtifact>,
    pub lifecycle: Vec<LifecycleHandler>,
    pub template_overrides: Vec<TemplateOverride>,
}

/// Run all four extractors over `plugin`. Fails if any of them fails.
pub fn extract_all(plugin: &dyn Plugin) -> Result<Extracted, DockyardError> {
    Ok(Extracted {
        services: ServiceExtractor.extract(plugin)?,
        commands: CommandExtractor.extract(plugin)?,
        lifecycle: LifecycleExtractor.extract(plugin)?,
        template_overrides: TemplateOverrideExtractor.extract(plugin)?,
    })
}
