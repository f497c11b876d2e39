// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Dockyard integration tests.
//!
//! # Components
//!
//! - [`TestPlugin`] - Plugin assembled from ready-made artifacts
//! - [`FailingPlugin`] - Plugin whose service operation fails on demand
//! - [`fixtures`] - Registries, configurations, and project directories

pub mod fixtures;
pub mod test_plugin;

pub use fixtures::{bundled_registry, registry_with, service_config, TestProject};
pub use test_plugin::{CallLog, FailingPlugin, TestPlugin};
