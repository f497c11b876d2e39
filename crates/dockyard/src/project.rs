// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A loaded project: its config, directory, and plugin registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dockyard_compose::{
    ConfigurationBuilder, HostProbe, PortAllocator, ProxySettings, Resolved, ServiceRequest,
    StrictPorts, TemplateStore,
};
use dockyard_config::{DockyardConfig, PROJECT_FILE};
use dockyard_core::DockyardError;
use dockyard_plugin::{bundled_plugins, load_plugin_manifest, Catalog, Plugin, PluginRegistry};
use tracing::{debug, info};

/// Directory relative project paths resolve against.
pub fn project_root(config_path: Option<&Path>) -> PathBuf {
    let file = config_path.unwrap_or(Path::new(PROJECT_FILE));
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub struct Project {
    pub config: DockyardConfig,
    pub root: PathBuf,
    pub registry: PluginRegistry,
}

impl Project {
    /// Register bundled plugins, then the project's manifests in listed order.
    pub fn open(config: DockyardConfig, root: PathBuf) -> Result<Self, DockyardError> {
        let mut project_plugins: Vec<Box<dyn Plugin>> = Vec::new();
        for path in &config.plugins.paths {
            let path = root.join(path);
            debug!(path = %path.display(), "loading plugin manifest");
            project_plugins.push(Box::new(load_plugin_manifest(&path)?));
        }

        let registry = PluginRegistry::load(bundled_plugins(), project_plugins)?;
        info!(
            plugins = registry.len(),
            services = registry.catalog().service_count(),
            "plugin registry initialized"
        );
        Ok(Self {
            config,
            root,
            registry,
        })
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.registry.catalog()
    }

    /// The `[[services]]` selection as resolver input.
    pub fn service_requests(&self) -> Vec<ServiceRequest> {
        self.config
            .services
            .iter()
            .map(|s| ServiceRequest {
                name: s.name.clone(),
                ports: s.ports.clone(),
                config: s.config.clone(),
            })
            .collect()
    }

    /// Resolve the selection against `catalog`.
    pub fn resolve(
        &self,
        catalog: &Catalog,
        check_host_ports: bool,
        strict_ports: bool,
    ) -> Result<Resolved, DockyardError> {
        let mut allocator = PortAllocator::new().with_window(self.config.project.port_window);
        if check_host_ports {
            allocator = allocator.with_probe(HostProbe);
        }
        let mut builder = ConfigurationBuilder::new(catalog).allocator(allocator);
        if strict_ports {
            builder = builder.policy(StrictPorts);
        }
        builder.build(&self.config.project.name, &self.service_requests())
    }

    pub fn proxy_settings(&self) -> ProxySettings {
        let project = &self.config.project;
        ProxySettings {
            enabled: project.proxy,
            domain: project.domain.clone(),
            tls: project.tls,
            network: project.proxy_network.clone(),
        }
    }

    pub fn template_store(&self) -> TemplateStore {
        match &self.config.plugins.templates_dir {
            Some(dir) => TemplateStore::with_dir(self.root.join(dir)),
            None => TemplateStore::new(),
        }
    }

    /// Manifest destination: the flag as given, else `project.output` under the root.
    pub fn output_path(&self, flag: Option<&Path>) -> PathBuf {
        match flag {
            Some(path) => path.to_path_buf(),
            None => self.root.join(&self.config.project.output),
        }
    }
}
