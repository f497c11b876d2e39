// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! From a service selection to a compose manifest.
//!
//! [`ConfigurationBuilder`] resolves requested services against a catalog
//! snapshot (schema validation plus [`PortAllocator`]), and
//! [`ComposeGenerator`] renders the resulting [`Configuration`] into
//! `docker-compose.yml` text with Traefik routing labels.
//!
//! [`Configuration`]: dockyard_core::Configuration

pub mod configure;
pub mod generator;
pub mod labels;
pub mod ports;
pub mod template;

pub use configure::{ConfigurationBuilder, Resolved, ServiceRequest};
pub use generator::{named_volumes, render_context, ComposeGenerator};
pub use labels::{hostname, router_id, traefik_labels, ProxySettings};
pub use ports::{
    AcceptReassignments, Allocation, HostProbe, NoProbe, PortAllocator, PortProbe, Reassignment,
    ReassignmentPolicy, StrictPorts, DEFAULT_WINDOW,
};
pub use template::{render, Template, TemplateStore};
