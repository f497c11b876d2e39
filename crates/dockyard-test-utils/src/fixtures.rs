// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture registries, configurations, and throwaway project directories.

use std::path::{Path, PathBuf};

use dockyard_core::{ConfigMap, DockyardError, ServiceCategory, ServiceConfig};
use dockyard_plugin::{bundled_plugins, Plugin, PluginRegistry};

/// Registry holding only the bundled plugins.
pub fn bundled_registry() -> Result<PluginRegistry, DockyardError> {
    PluginRegistry::load(bundled_plugins(), Vec::new())
}

/// Registry holding the bundled plugins followed by `project` plugins.
pub fn registry_with(project: Vec<Box<dyn Plugin>>) -> Result<PluginRegistry, DockyardError> {
    PluginRegistry::load(bundled_plugins(), project)
}

/// A resolved service entry with an empty environment.
pub fn service_config(name: &str, category: ServiceCategory, ports: &[u16]) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        category,
        environment: ConfigMap::new(),
        ports: ports.to_vec(),
    }
}

/// A temporary project directory, removed on drop.
pub struct TestProject {
    dir: tempfile::TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self, DockyardError> {
        let dir = tempfile::tempdir().map_err(|source| DockyardError::Io {
            path: std::env::temp_dir().display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf, DockyardError> {
        let path = self.dir.path().join(relative);
        let io_err = |source| DockyardError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&path, content).map_err(io_err)?;
        tracing::debug!(path = %path.display(), "wrote fixture file");
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<String, DockyardError> {
        let path = self.dir.path().join(relative);
        std::fs::read_to_string(&path).map_err(|source| DockyardError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
