// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a project's service selection into a resolved [`Configuration`].
//!
//! For each requested service, in order: look it up in the catalog, reject
//! duplicates, validate overrides against the service's schema, and place
//! its host ports.

use std::collections::HashSet;

use dockyard_core::{ConfigMap, Configuration, DockyardError, ServiceConfig};
use dockyard_plugin::{Catalog, ServiceDefinition};
use serde_json::Value;
use tracing::{debug, warn};

use crate::ports::{AcceptReassignments, PortAllocator, Reassignment, ReassignmentPolicy};

/// Minimum Jaro-Winkler similarity for config key suggestions.
const KEY_SUGGESTION_THRESHOLD: f64 = 0.8;

/// One selected service and its overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceRequest {
    pub name: String,
    /// Host ports to request instead of the definition's.
    pub ports: Option<Vec<u16>>,
    pub config: ConfigMap,
}

impl ServiceRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = Some(ports);
        self
    }
}

/// A resolved configuration plus the port moves it took to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub configuration: Configuration,
    pub reassignments: Vec<Reassignment>,
}

/// Resolves service requests against a catalog snapshot.
pub struct ConfigurationBuilder<'a> {
    catalog: &'a Catalog,
    allocator: PortAllocator,
    policy: Box<dyn ReassignmentPolicy + 'a>,
}

impl<'a> ConfigurationBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            allocator: PortAllocator::new(),
            policy: Box::new(AcceptReassignments),
        }
    }

    pub fn allocator(mut self, allocator: PortAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn policy(mut self, policy: impl ReassignmentPolicy + 'a) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Resolve `requests` for `project`, in request order.
    pub fn build(
        mut self,
        project: &str,
        requests: &[ServiceRequest],
    ) -> Result<Resolved, DockyardError> {
        let mut seen = HashSet::new();
        let mut services = Vec::with_capacity(requests.len());
        let mut reassignments = Vec::new();

        for request in requests {
            let definition = self.catalog.service(&request.name).ok_or_else(|| {
                DockyardError::ServiceNotFound {
                    name: request.name.clone(),
                    suggestion: self.catalog.suggest_service(&request.name),
                }
            })?;
            if !seen.insert(request.name.as_str()) {
                return Err(DockyardError::DuplicateService {
                    name: request.name.clone(),
                });
            }

            let environment = resolve_environment(definition, &request.config)?;

            let requested = match &request.ports {
                Some(ports) => {
                    if ports.len() != definition.internal_ports().len() {
                        return Err(DockyardError::Config(format!(
                            "service `{}` exposes {} ports but {} were requested",
                            request.name,
                            definition.internal_ports().len(),
                            ports.len()
                        )));
                    }
                    ports.as_slice()
                }
                None => definition.ports(),
            };
            let allocation =
                self.allocator
                    .allocate(&request.name, requested, self.policy.as_ref())?;

            debug!(service = %request.name, ports = ?allocation.ports, "service resolved");
            reassignments.extend(allocation.reassignments);
            services.push(ServiceConfig {
                name: request.name.clone(),
                category: definition.category(),
                environment,
                ports: allocation.ports,
            });
        }

        Ok(Resolved {
            configuration: Configuration {
                project: project.to_string(),
                services,
            },
            reassignments,
        })
    }
}

/// Validated schema fields plus overrides of the definition's template
/// variables. Anything else is dropped with a warning.
fn resolve_environment(
    definition: &ServiceDefinition,
    overrides: &ConfigMap,
) -> Result<ConfigMap, DockyardError> {
    let mut environment = match definition.schema() {
        Some(schema) => schema.validate(overrides)?,
        None => ConfigMap::new(),
    };

    let undeclared = match definition.schema() {
        Some(schema) => schema.unknown_keys(overrides),
        None => overrides.keys().map(String::as_str).collect(),
    };
    for key in undeclared {
        if definition.default_config().contains_key(key)
            && let Some(value) = overrides.get(key)
        {
            environment.insert(key.to_string(), value.clone());
            continue;
        }
        let known = known_keys(definition);
        match suggest(key, &known) {
            Some(suggestion) => warn!(
                service = definition.name(),
                key = %key,
                "ignoring unknown config key (did you mean `{suggestion}`?)"
            ),
            None => warn!(service = definition.name(), key = %key, "ignoring unknown config key"),
        }
    }
    Ok(environment)
}

fn known_keys(definition: &ServiceDefinition) -> Vec<&str> {
    let mut keys: Vec<&str> = definition
        .schema()
        .map(|s| s.fields().iter().map(|f| f.key.as_str()).collect())
        .unwrap_or_default();
    keys.extend(definition.default_config().keys().map(String::as_str));
    keys
}

fn suggest<'k>(unknown: &str, known: &[&'k str]) -> Option<&'k str> {
    known
        .iter()
        .map(|&k| (strsim::jaro_winkler(unknown, k), k))
        .filter(|(score, _)| *score > KEY_SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k)
}
