// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host port allocation with a bounded upward search.
//!
//! Each requested port is taken as-is when free. Otherwise the next `window`
//! ports above it are tried in order. Ports committed earlier in the same
//! run are never handed out twice, and a service's ports are committed only
//! once all of them have been placed.

use std::collections::BTreeSet;
use std::net::TcpListener;

use dockyard_core::PortAllocationError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Ports probed above a taken one.
pub const DEFAULT_WINDOW: u16 = 10;

/// Checks whether a port is free outside the current run.
pub trait PortProbe: Send + Sync {
    fn is_free(&self, port: u16) -> bool;
}

/// Treats every port as free; only the committed set matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl PortProbe for NoProbe {
    fn is_free(&self, _port: u16) -> bool {
        true
    }
}

/// Probes the host by binding a TCP listener on all interfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl PortProbe for HostProbe {
    fn is_free(&self, port: u16) -> bool {
        TcpListener::bind(("0.0.0.0", port)).is_ok()
    }
}

/// A requested port that had to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    pub service: String,
    pub requested: u16,
    pub assigned: u16,
}

/// Decides whether a reassignment is acceptable.
pub trait ReassignmentPolicy {
    fn approve(&self, reassignment: &Reassignment) -> bool;
}

/// Accepts every reassignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptReassignments;

impl ReassignmentPolicy for AcceptReassignments {
    fn approve(&self, _reassignment: &Reassignment) -> bool {
        true
    }
}

/// Rejects every reassignment, so requested ports must be free.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictPorts;

impl ReassignmentPolicy for StrictPorts {
    fn approve(&self, _reassignment: &Reassignment) -> bool {
        false
    }
}

impl<F> ReassignmentPolicy for F
where
    F: Fn(&Reassignment) -> bool,
{
    fn approve(&self, reassignment: &Reassignment) -> bool {
        self(reassignment)
    }
}

/// Ports placed for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Assigned host ports, positionally matching the request.
    pub ports: Vec<u16>,
    /// Requested ports that moved.
    pub reassignments: Vec<Reassignment>,
}

/// Allocates host ports for one generation run.
pub struct PortAllocator {
    committed: BTreeSet<u16>,
    window: u16,
    probe: Box<dyn PortProbe>,
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PortAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortAllocator")
            .field("committed", &self.committed)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl PortAllocator {
    /// Allocator with the default window and no host probing.
    pub fn new() -> Self {
        Self {
            committed: BTreeSet::new(),
            window: DEFAULT_WINDOW,
            probe: Box::new(NoProbe),
        }
    }

    pub fn with_window(mut self, window: u16) -> Self {
        self.window = window;
        self
    }

    pub fn with_probe(mut self, probe: impl PortProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Mark ports as taken without allocating them to a service.
    pub fn reserve(&mut self, ports: impl IntoIterator<Item = u16>) {
        self.committed.extend(ports);
    }

    /// Ports committed so far, ascending.
    pub fn committed(&self) -> &BTreeSet<u16> {
        &self.committed
    }

    pub fn window(&self) -> u16 {
        self.window
    }

    /// Place every requested port for `service`.
    ///
    /// On error nothing is committed.
    pub fn allocate(
        &mut self,
        service: &str,
        requested: &[u16],
        policy: &dyn ReassignmentPolicy,
    ) -> Result<Allocation, PortAllocationError> {
        let mut allocation = Allocation::default();

        for &port in requested {
            let assigned = self
                .find_free(port, &allocation.ports)
                .ok_or_else(|| PortAllocationError::NoPortsAvailable {
                    service: service.to_string(),
                    requested: port,
                    window: u32::from(port) + u32::from(self.window),
                })?;

            if assigned != port {
                let reassignment = Reassignment {
                    service: service.to_string(),
                    requested: port,
                    assigned,
                };
                if !policy.approve(&reassignment) {
                    return Err(PortAllocationError::ReassignmentRejected {
                        service: service.to_string(),
                        requested: port,
                    });
                }
                info!(service, requested = port, assigned, "host port reassigned");
                allocation.reassignments.push(reassignment);
            } else {
                debug!(service, port, "host port allocated");
            }
            allocation.ports.push(assigned);
        }

        self.committed.extend(allocation.ports.iter().copied());
        Ok(allocation)
    }

    fn find_free(&self, port: u16, pending: &[u16]) -> Option<u16> {
        (0..=self.window).find_map(|offset| {
            let candidate = port.checked_add(offset)?;
            self.is_available(candidate, pending).then_some(candidate)
        })
    }

    fn is_available(&self, port: u16, pending: &[u16]) -> bool {
        !self.committed.contains(&port) && !pending.contains(&port) && self.probe.is_free(port)
    }
}
