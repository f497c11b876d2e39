// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service definitions: the canonical description of one composable service.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dockyard_core::{ConfigMap, DockyardError, ServiceCategory};

use crate::schema::ConfigSchema;

/// Container health check, emitted as the compose `healthcheck` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Test command in compose form, e.g. `["CMD", "pg_isready"]`.
    pub test: Vec<String>,
    pub interval: Duration,
    pub timeout: Duration,
    pub retries: u32,
}

impl HealthCheck {
    /// Health check running `args` directly (`CMD` form).
    pub fn cmd<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut test = vec!["CMD".to_string()];
        test.extend(args.into_iter().map(Into::into));
        Self {
            test,
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            retries: 5,
        }
    }

    /// Health check running `command` through the container shell (`CMD-SHELL` form).
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            test: vec!["CMD-SHELL".to_string(), command.into()],
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            retries: 5,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Builds a command vector from a service's resolved config.
pub type CommandBuilder = Arc<dyn Fn(&ConfigMap) -> Vec<String> + Send + Sync>;

/// Dump, restore, and shell commands for database services.
///
/// Each command is a pure function of the service's resolved config and is
/// run inside the service container by an external executor.
#[derive(Clone)]
pub struct DatabaseOps {
    pub dump: CommandBuilder,
    pub restore: CommandBuilder,
    pub shell: CommandBuilder,
}

impl DatabaseOps {
    pub fn new<D, R, S>(dump: D, restore: R, shell: S) -> Self
    where
        D: Fn(&ConfigMap) -> Vec<String> + Send + Sync + 'static,
        R: Fn(&ConfigMap) -> Vec<String> + Send + Sync + 'static,
        S: Fn(&ConfigMap) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            dump: Arc::new(dump),
            restore: Arc::new(restore),
            shell: Arc::new(shell),
        }
    }
}

impl fmt::Debug for DatabaseOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseOps").finish_non_exhaustive()
    }
}

/// Immutable description of one composable service.
///
/// Built through [`ServiceDefinition::builder`], which enforces that
/// `ports` and `internal_ports` are either both empty or positionally paired.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    name: String,
    template_ref: String,
    display_name: String,
    description: String,
    icon: String,
    category: ServiceCategory,
    ports: Vec<u16>,
    internal_ports: Vec<u16>,
    default_config: ConfigMap,
    health_check: Option<HealthCheck>,
    database_ops: Option<DatabaseOps>,
    schema: Option<Arc<ConfigSchema>>,
    http_exposed: bool,
}

impl ServiceDefinition {
    /// Start building a service. The template reference defaults to `<name>.yml`.
    pub fn builder(name: impl Into<String>, category: ServiceCategory) -> ServiceDefinitionBuilder {
        let name = name.into();
        ServiceDefinitionBuilder {
            def: ServiceDefinition {
                template_ref: format!("{name}.yml"),
                display_name: name.clone(),
                name,
                description: String::new(),
                icon: String::new(),
                category,
                ports: Vec::new(),
                internal_ports: Vec::new(),
                default_config: ConfigMap::new(),
                health_check: None,
                database_ops: None,
                schema: None,
                http_exposed: false,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_ref(&self) -> &str {
        &self.template_ref
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    /// Requested host ports.
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Container-side ports, paired with [`ServiceDefinition::ports`].
    pub fn internal_ports(&self) -> &[u16] {
        &self.internal_ports
    }

    /// Template variables merged under user config at render time.
    pub fn default_config(&self) -> &ConfigMap {
        &self.default_config
    }

    pub fn health_check(&self) -> Option<&HealthCheck> {
        self.health_check.as_ref()
    }

    pub fn database_ops(&self) -> Option<&DatabaseOps> {
        self.database_ops.as_ref()
    }

    pub fn schema(&self) -> Option<&ConfigSchema> {
        self.schema.as_deref()
    }

    /// Whether the reverse proxy should route HTTP traffic to this service.
    pub fn http_exposed(&self) -> bool {
        self.http_exposed
    }

    /// `default_config` overlaid with a service's validated environment.
    pub fn merged_config(&self, environment: &ConfigMap) -> ConfigMap {
        let mut merged = self.default_config.clone();
        for (key, value) in environment {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Container port the reverse proxy forwards to.
    pub fn http_port(&self) -> Option<u16> {
        if self.http_exposed {
            self.internal_ports.first().copied()
        } else {
            None
        }
    }
}

/// Builder for [`ServiceDefinition`].
#[must_use]
pub struct ServiceDefinitionBuilder {
    def: ServiceDefinition,
}

impl ServiceDefinitionBuilder {
    pub fn template(mut self, template_ref: impl Into<String>) -> Self {
        self.def.template_ref = template_ref.into();
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.def.display_name = display_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.def.description = description.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.def.icon = icon.into();
        self
    }

    /// Map requested host port `host` to container port `internal`.
    pub fn port(mut self, host: u16, internal: u16) -> Self {
        self.def.ports.push(host);
        self.def.internal_ports.push(internal);
        self
    }

    /// Set both port lists at once. Lengths are checked by [`Self::build`].
    pub fn ports(mut self, host: Vec<u16>, internal: Vec<u16>) -> Self {
        self.def.ports = host;
        self.def.internal_ports = internal;
        self
    }

    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.def.default_config.insert(key.into(), value.into());
        self
    }

    pub fn default_config(mut self, config: ConfigMap) -> Self {
        self.def.default_config = config;
        self
    }

    pub fn health_check(mut self, health_check: HealthCheck) -> Self {
        self.def.health_check = Some(health_check);
        self
    }

    pub fn database_ops(mut self, ops: DatabaseOps) -> Self {
        self.def.database_ops = Some(ops);
        self
    }

    pub fn schema(mut self, schema: ConfigSchema) -> Self {
        self.def.schema = Some(Arc::new(schema));
        self
    }

    pub fn http(mut self) -> Self {
        self.def.http_exposed = true;
        self
    }

    /// Finish the definition, checking its structural invariants.
    pub fn build(self) -> Result<ServiceDefinition, DockyardError> {
        let def = self.def;
        let invalid = |reason: String| DockyardError::InvalidServiceDefinition {
            name: def.name.clone(),
            reason,
        };

        if def.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if def.template_ref.trim().is_empty() {
            return Err(invalid("template reference must not be empty".to_string()));
        }
        if !def.ports.is_empty()
            && !def.internal_ports.is_empty()
            && def.ports.len() != def.internal_ports.len()
        {
            return Err(invalid(format!(
                "{} host ports but {} internal ports",
                def.ports.len(),
                def.internal_ports.len()
            )));
        }
        if def.ports.is_empty() != def.internal_ports.is_empty() {
            return Err(invalid(
                "host and internal ports must both be set or both be empty".to_string(),
            ));
        }
        if def.ports.contains(&0) || def.internal_ports.contains(&0) {
            return Err(invalid("port 0 is not a valid mapping".to_string()));
        }
        if def.http_exposed && def.internal_ports.is_empty() {
            return Err(invalid("HTTP-exposed services need an internal port".to_string()));
        }

        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_pairs_ports() {
        let def = ServiceDefinition::builder("postgres", ServiceCategory::Database)
            .port(5432, 5432)
            .default_value("version", "16")
            .build()
            .unwrap();
        assert_eq!(def.ports(), &[5432]);
        assert_eq!(def.internal_ports(), &[5432]);
        assert_eq!(def.template_ref(), "postgres.yml");
        assert_eq!(def.default_config()["version"], json!("16"));
        assert!(def.http_port().is_none());
    }

    #[test]
    fn mismatched_port_lengths_are_rejected() {
        let err = ServiceDefinition::builder("bad", ServiceCategory::Misc)
            .ports(vec![80, 443], vec![80])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DockyardError::InvalidServiceDefinition { reason, .. } if reason.contains("2 host ports")
        ));
    }

    #[test]
    fn one_sided_ports_are_rejected() {
        let err = ServiceDefinition::builder("bad", ServiceCategory::Misc)
            .ports(vec![80], vec![])
            .build()
            .unwrap_err();
        assert!(matches!(err, DockyardError::InvalidServiceDefinition { .. }));
    }

    #[test]
    fn file_based_service_has_no_ports() {
        let def = ServiceDefinition::builder("sqlite", ServiceCategory::Database)
            .build()
            .unwrap();
        assert!(def.ports().is_empty());
        assert!(def.internal_ports().is_empty());
    }

    #[test]
    fn http_service_needs_a_port() {
        let err = ServiceDefinition::builder("web", ServiceCategory::Utility)
            .http()
            .build()
            .unwrap_err();
        assert!(matches!(err, DockyardError::InvalidServiceDefinition { .. }));

        let def = ServiceDefinition::builder("web", ServiceCategory::Utility)
            .port(8025, 8025)
            .port(1025, 1025)
            .http()
            .build()
            .unwrap();
        assert_eq!(def.http_port(), Some(8025));
    }

    #[test]
    fn database_ops_are_pure_functions_of_config() {
        let ops = DatabaseOps::new(
            |c| vec!["dump".into(), c["db"].as_str().unwrap_or_default().into()],
            |_| vec!["restore".into()],
            |_| vec!["shell".into()],
        );
        let mut config = ConfigMap::new();
        config.insert("db".into(), json!("app"));
        assert_eq!((ops.dump)(&config), vec!["dump", "app"]);
        assert_eq!((ops.dump)(&config), (ops.dump)(&config));
    }

    #[test]
    fn health_check_forms() {
        let hc = HealthCheck::cmd(["redis-cli", "ping"]).with_retries(3);
        assert_eq!(hc.test, vec!["CMD", "redis-cli", "ping"]);
        assert_eq!(hc.retries, 3);

        let hc = HealthCheck::shell("pg_isready -U app");
        assert_eq!(hc.test[0], "CMD-SHELL");
    }
}
