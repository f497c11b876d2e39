// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Dockyard composition engine.

use serde_json::Value;
use thiserror::Error;

/// Boxed error returned by plugin-provided operations and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across the Dockyard workspace.
#[derive(Debug, Error)]
pub enum DockyardError {
    /// Project configuration errors (invalid TOML, bad plugin manifest).
    #[error("configuration error: {0}")]
    Config(String),

    /// A config value failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A schema declared the same field key twice.
    #[error("field `{key}` is already declared in this schema")]
    DuplicateField { key: String },

    /// A plugin with the same identity name is already registered.
    #[error("plugin `{name}` is already registered")]
    DuplicatePlugin { name: String },

    /// A capability operation on a plugin failed while being invoked.
    #[error("plugin `{plugin}` failed to provide `{member}`: {source}")]
    Extraction {
        plugin: String,
        member: String,
        source: BoxError,
    },

    /// A service definition violates its structural invariants.
    #[error("invalid service definition `{name}`: {reason}")]
    InvalidServiceDefinition { name: String, reason: String },

    /// Host port allocation failed for a service.
    #[error(transparent)]
    PortAllocation(#[from] PortAllocationError),

    /// Template rendering failed.
    #[error("failed to render template `{path}`: {detail}")]
    TemplateRender { path: String, detail: String },

    /// A selected service is not present in the service catalog.
    #[error("unknown service `{name}`{}", suggestion_suffix(.suggestion.as_deref()))]
    ServiceNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// The same service was selected twice for one project.
    #[error("service `{name}` is selected more than once")]
    DuplicateService { name: String },

    /// A lifecycle handler returned an error.
    #[error("lifecycle handler for `{event}` from plugin `{plugin}` failed: {source}")]
    Lifecycle {
        event: String,
        plugin: String,
        source: BoxError,
    },

    /// Filesystem errors while reading templates or writing the manifest.
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{s}`?)"),
        None => String::new(),
    }
}

/// Field-scoped validation failures raised by a config schema.
///
/// These are recoverable: the caller can re-prompt for the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The value's runtime type does not match the declared field type.
    #[error("field `{field}` expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// An integer value falls outside the declared bounds.
    #[error("field `{field}` value {value} is outside the range [{min}, {max}]")]
    Range {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The value is not a member of the field's allowed set.
    #[error("field `{field}` value {value} is not one of: {}", format_allowed(.allowed))]
    EnumViolation {
        field: String,
        value: Value,
        allowed: Vec<Value>,
    },
}

impl ValidationError {
    /// The key of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::Range { field, .. }
            | Self::EnumViolation { field, .. } => field,
        }
    }
}

fn format_allowed(allowed: &[Value]) -> String {
    allowed
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Host port allocation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortAllocationError {
    /// The requested port and every candidate in the probe window are taken.
    #[error("no free port for `{service}`: {requested} through {window} are all in use")]
    NoPortsAvailable {
        service: String,
        requested: u16,
        window: u32,
    },

    /// The caller refused a substitute port.
    #[error("reassignment of port {requested} for `{service}` was rejected")]
    ReassignmentRejected { service: String, requested: u16 },
}
