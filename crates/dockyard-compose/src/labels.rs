// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traefik routing labels for HTTP-exposed services.

use serde::{Deserialize, Serialize};

/// Reverse-proxy settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Emit labels and attach the proxy network.
    pub enabled: bool,
    /// Hostname suffix, e.g. `localhost`.
    pub domain: String,
    /// Route through the `websecure` entrypoint with TLS on.
    pub tls: bool,
    /// External network the proxy and routed services share.
    pub network: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            domain: "localhost".to_string(),
            tls: false,
            network: "dockyard-proxy".to_string(),
        }
    }
}

impl ProxySettings {
    /// Settings with the proxy turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn entrypoint(&self) -> &'static str {
        if self.tls { "websecure" } else { "web" }
    }
}

/// Router and service identifier: `<project>-<service>`.
pub fn router_id(project: &str, service: &str) -> String {
    format!("{project}-{service}")
}

/// Public hostname: `<service>.<project>.<domain>`.
pub fn hostname(service: &str, project: &str, domain: &str) -> String {
    format!("{service}.{project}.{domain}")
}

/// Labels routing `<service>.<project>.<domain>` to `port` inside the container.
///
/// Returned in a fixed order so manifests are reproducible.
pub fn traefik_labels(
    project: &str,
    service: &str,
    port: u16,
    settings: &ProxySettings,
) -> Vec<(String, String)> {
    let id = router_id(project, service);
    let router = format!("traefik.http.routers.{id}");
    vec![
        ("traefik.enable".to_string(), "true".to_string()),
        (
            format!("{router}.rule"),
            format!("Host(`{}`)", hostname(service, project, &settings.domain)),
        ),
        (
            format!("{router}.entrypoints"),
            settings.entrypoint().to_string(),
        ),
        (format!("{router}.tls"), settings.tls.to_string()),
        (format!("{router}.service"), id.clone()),
        (
            format!("traefik.http.services.{id}.loadbalancer.server.port"),
            port.to_string(),
        ),
    ]
}
