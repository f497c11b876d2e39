// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compose manifest generation.
//!
//! Each selected service's template is rendered against its context, parsed
//! as a YAML mapping, and completed with the structured keys the template
//! left out: `ports`, `environment`, `healthcheck`, and (for HTTP-exposed
//! services behind the proxy) `labels` and `networks`. Mappings keep
//! insertion order, so identical input yields identical bytes.

use std::sync::Arc;
use std::time::Duration;

use dockyard_core::{value_to_env_string, ConfigMap, Configuration, DockyardError, ServiceConfig};
use dockyard_plugin::{Catalog, HealthCheck, ServiceDefinition};
use serde_json::{json, Value as JsonValue};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::labels::{traefik_labels, ProxySettings};
use crate::template::{render, TemplateStore};

/// Builds compose manifests from resolved configurations.
#[derive(Debug, Clone)]
pub struct ComposeGenerator {
    catalog: Arc<Catalog>,
    templates: TemplateStore,
    proxy: ProxySettings,
}

impl ComposeGenerator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            templates: TemplateStore::new(),
            proxy: ProxySettings::default(),
        }
    }

    pub fn templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = proxy;
        self
    }

    /// Render the full manifest for `configuration`.
    pub fn generate(&self, configuration: &Configuration) -> Result<String, DockyardError> {
        let mut services = Mapping::new();
        let mut volumes: Vec<String> = Vec::new();
        let mut uses_proxy_network = false;

        for service in &configuration.services {
            let (body, routed) = self.render_service(&configuration.project, service)?;
            for volume in named_volumes(&body) {
                if !volumes.contains(&volume) {
                    volumes.push(volume);
                }
            }
            uses_proxy_network |= routed;
            services.insert(Value::from(service.name.as_str()), Value::Mapping(body));
        }

        let mut root = Mapping::new();
        root.insert("name".into(), configuration.project.as_str().into());
        root.insert("services".into(), Value::Mapping(services));

        if !volumes.is_empty() {
            let declared: Mapping = volumes
                .into_iter()
                .map(|name| (Value::String(name), Value::Null))
                .collect();
            root.insert("volumes".into(), Value::Mapping(declared));
        }

        if uses_proxy_network {
            let mut external = Mapping::new();
            external.insert("external".into(), Value::Bool(true));
            let mut networks = Mapping::new();
            networks.insert(
                self.proxy.network.as_str().into(),
                Value::Mapping(external),
            );
            root.insert("networks".into(), Value::Mapping(networks));
        }

        serde_yaml::to_string(&Value::Mapping(root))
            .map_err(|e| DockyardError::Internal(format!("failed to serialize manifest: {e}")))
    }

    /// Render one service body. The flag is true when the service was
    /// attached to the proxy network.
    pub fn render_service(
        &self,
        project: &str,
        service: &ServiceConfig,
    ) -> Result<(Mapping, bool), DockyardError> {
        let definition =
            self.catalog
                .service(&service.name)
                .ok_or_else(|| DockyardError::ServiceNotFound {
                    name: service.name.clone(),
                    suggestion: self.catalog.suggest_service(&service.name),
                })?;

        let template = self
            .templates
            .load(self.catalog.resolve_template(definition))?;
        let context = render_context(definition, project, service);
        let text = render(&template.path, &template.body, &context)?;
        let mut body = parse_body(&template.path, &text)?;
        debug!(service = %service.name, template = %template.path, "rendered service template");

        if !body.contains_key("ports") && !service.ports.is_empty() {
            let ports = service
                .ports
                .iter()
                .zip(definition.internal_ports())
                .map(|(host, container)| Value::String(format!("{host}:{container}")))
                .collect();
            body.insert("ports".into(), Value::Sequence(ports));
        }

        let env = environment_vars(definition, &service.environment);
        if !body.contains_key("environment") && !env.is_empty() {
            let vars = env
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), Value::String(value_to_env_string(v))))
                .collect();
            body.insert("environment".into(), Value::Mapping(vars));
        }

        if !body.contains_key("healthcheck")
            && let Some(hc) = definition.health_check()
        {
            body.insert("healthcheck".into(), healthcheck(hc));
        }

        let routed = match definition.http_port() {
            Some(port) if self.proxy.enabled => {
                let labels = traefik_labels(project, &service.name, port, &self.proxy);
                merge_labels(&mut body, labels);
                attach_network(&mut body, &self.proxy.network);
                true
            }
            _ => false,
        };

        Ok((body, routed))
    }
}

/// Values a template can reference.
pub fn render_context(
    definition: &ServiceDefinition,
    project: &str,
    service: &ServiceConfig,
) -> JsonValue {
    let health_check = definition.health_check().map(|hc| {
        json!({
            "test": hc.test,
            "interval": format_duration(hc.interval),
            "timeout": format_duration(hc.timeout),
            "retries": hc.retries,
        })
    });
    json!({
        "name": service.name,
        "project": project,
        "config": definition.merged_config(&service.environment),
        "env": environment_vars(definition, &service.environment),
        "ports": service.ports,
        "internal_ports": definition.internal_ports(),
        "health_check": health_check,
    })
}

/// The schema-declared subset of a service's environment.
fn environment_vars(definition: &ServiceDefinition, environment: &ConfigMap) -> ConfigMap {
    let Some(schema) = definition.schema() else {
        return ConfigMap::new();
    };
    environment
        .iter()
        .filter(|(k, _)| schema.get(k).is_some())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn parse_body(path: &str, text: &str) -> Result<Mapping, DockyardError> {
    let invalid = |detail: String| DockyardError::TemplateRender {
        path: path.to_string(),
        detail,
    };
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Mapping(body)) => Ok(body),
        Ok(_) => Err(invalid("rendered template is not a YAML mapping".to_string())),
        Err(e) => Err(invalid(format!("rendered template is not valid YAML: {e}"))),
    }
}

fn healthcheck(hc: &HealthCheck) -> Value {
    let mut map = Mapping::new();
    map.insert(
        "test".into(),
        Value::Sequence(hc.test.iter().map(|s| Value::from(s.as_str())).collect()),
    );
    map.insert("interval".into(), format_duration(hc.interval).into());
    map.insert("timeout".into(), format_duration(hc.timeout).into());
    map.insert("retries".into(), Value::Number(hc.retries.into()));
    Value::Mapping(map)
}

/// Compose duration string: `10s`, or `1500ms` for sub-second precision.
fn format_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

/// Add proxy labels the template did not set, in either compose label form.
fn merge_labels(body: &mut Mapping, labels: Vec<(String, String)>) {
    match body.get_mut("labels") {
        Some(Value::Sequence(list)) => {
            for (key, value) in labels {
                let prefix = format!("{key}=");
                let present = list
                    .iter()
                    .any(|l| l.as_str().is_some_and(|s| s.starts_with(&prefix)));
                if !present {
                    list.push(Value::String(format!("{key}={value}")));
                }
            }
        }
        Some(Value::Mapping(map)) => {
            for (key, value) in labels {
                if !map.contains_key(key.as_str()) {
                    map.insert(Value::String(key), Value::String(value));
                }
            }
        }
        _ => {
            let map = labels
                .into_iter()
                .map(|(k, v)| (Value::String(k), Value::String(v)))
                .collect();
            body.insert("labels".into(), Value::Mapping(map));
        }
    }
}

/// Put the service on the proxy network, keeping it on `default` too.
fn attach_network(body: &mut Mapping, network: &str) {
    match body.get_mut("networks") {
        Some(Value::Sequence(list)) => {
            if !list.iter().any(|n| n.as_str() == Some(network)) {
                list.push(network.into());
            }
        }
        Some(Value::Mapping(map)) => {
            if !map.contains_key(network) {
                map.insert(network.into(), Value::Null);
            }
        }
        _ => {
            body.insert(
                "networks".into(),
                Value::Sequence(vec!["default".into(), network.into()]),
            );
        }
    }
}

/// Named volumes a service mounts, in mount order.
///
/// Bind mounts (paths starting with `.`, `/`, `~` or a variable) and
/// anonymous volumes are skipped.
pub fn named_volumes(body: &Mapping) -> Vec<String> {
    let Some(Value::Sequence(mounts)) = body.get("volumes") else {
        return Vec::new();
    };
    mounts
        .iter()
        .filter_map(|mount| match mount {
            Value::String(short) => {
                let (source, _) = short.split_once(':')?;
                let named = !source.is_empty() && !source.starts_with(['.', '/', '~', '$']);
                named.then(|| source.to_string())
            }
            Value::Mapping(long) => {
                let is_volume = long.get("type").and_then(Value::as_str) == Some("volume");
                let source = long.get("source").and_then(Value::as_str)?;
                is_volume.then(|| source.to_string())
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_format_for_compose() {
        assert_eq!(format_duration(Duration::from_secs(10)), "10s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
    }

    #[test]
    fn named_volumes_skip_bind_mounts() {
        let body: Mapping = serde_yaml::from_str(
            r#"
volumes:
  - "pg-data:/var/lib/postgresql/data"
  - "./data:/data"
  - "/var/run/docker.sock:/var/run/docker.sock:ro"
  - "/anonymous"
  - type: volume
    source: cache
    target: /cache
  - type: bind
    source: ./src
    target: /src
"#,
        )
        .unwrap();
        assert_eq!(named_volumes(&body), vec!["pg-data", "cache"]);
    }

    #[test]
    fn template_labels_win_over_derived_ones() {
        let mut body: Mapping =
            serde_yaml::from_str("labels:\n  traefik.enable: \"false\"\n").unwrap();
        merge_labels(
            &mut body,
            vec![
                ("traefik.enable".into(), "true".into()),
                ("traefik.http.routers.x.tls".into(), "false".into()),
            ],
        );
        let labels = body.get("labels").unwrap();
        assert_eq!(labels.get("traefik.enable").unwrap().as_str(), Some("false"));
        assert!(labels.get("traefik.http.routers.x.tls").is_some());
    }

    #[test]
    fn list_form_labels_are_extended() {
        let mut body: Mapping = serde_yaml::from_str("labels:\n  - \"a=b\"\n").unwrap();
        merge_labels(&mut body, vec![("c".into(), "d".into())]);
        let labels = body.get("labels").unwrap().as_sequence().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].as_str(), Some("c=d"));
    }

    #[test]
    fn network_is_added_once() {
        let mut body = Mapping::new();
        attach_network(&mut body, "edge");
        attach_network(&mut body, "edge");
        let networks = body.get("networks").unwrap().as_sequence().unwrap();
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].as_str(), Some("default"));
        assert_eq!(networks[1].as_str(), Some("edge"));
    }

    #[test]
    fn non_mapping_template_is_rejected() {
        let err = parse_body("x.yml", "- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("not a YAML mapping"));
        let err = parse_body("x.yml", "image: [unclosed\n").unwrap_err();
        assert!(err.to_string().contains("not valid YAML"));
    }
}
