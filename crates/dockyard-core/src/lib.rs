// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Dockyard composition engine.
//!
//! This crate provides the error taxonomy and the value types shared by the
//! plugin registry, the compose generator, and the CLI.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BoxError, DockyardError, PortAllocationError, ValidationError};
pub use types::{
    value_to_env_string, value_type_name, ConfigMap, Configuration, PluginIdentity,
    ServiceCategory, ServiceConfig,
};
