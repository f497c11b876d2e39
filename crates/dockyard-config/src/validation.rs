// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::DockyardConfig;

/// Validate a deserialized project file.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &DockyardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let name = config.project.name.trim();
    if name.is_empty() {
        fail("project.name must not be empty".to_string());
    } else if !is_valid_project_name(name) {
        fail(format!(
            "project.name `{name}` must start with a lowercase letter or digit and contain only lowercase letters, digits, `-` and `_`"
        ));
    }

    if config.project.domain.trim().is_empty() {
        fail("project.domain must not be empty".to_string());
    }

    if config.project.port_window == 0 {
        fail("project.port_window must be at least 1".to_string());
    }

    if config.project.output.as_os_str().is_empty() {
        fail("project.output must not be empty".to_string());
    }

    if config.project.proxy && config.project.proxy_network.trim().is_empty() {
        fail("project.proxy_network must not be empty when the proxy is enabled".to_string());
    }

    let mut seen = HashSet::new();
    for (i, service) in config.services.iter().enumerate() {
        if service.name.trim().is_empty() {
            fail(format!("services[{i}].name must not be empty"));
        } else if !seen.insert(service.name.as_str()) {
            fail(format!(
                "duplicate service `{}` in [[services]] array",
                service.name
            ));
        }
        if let Some(ports) = &service.ports
            && ports.contains(&0)
        {
            fail(format!("services[{i}].ports must not contain port 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Compose project names: `[a-z0-9][a-z0-9_-]*`.
fn is_valid_project_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceSelection;

    fn messages(config: &DockyardConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&DockyardConfig::default()).is_ok());
    }

    #[test]
    fn project_name_rules() {
        assert!(is_valid_project_name("shop"));
        assert!(is_valid_project_name("shop-api_2"));
        assert!(is_valid_project_name("9lives"));
        assert!(!is_valid_project_name("Shop"));
        assert!(!is_valid_project_name("-shop"));
        assert!(!is_valid_project_name("shop.api"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = DockyardConfig::default();
        config.project.name = "".to_string();
        config.project.domain = " ".to_string();
        config.project.port_window = 0;
        let messages = messages(&config);
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("project.name"));
        assert!(messages[1].contains("project.domain"));
        assert!(messages[2].contains("port_window"));
    }

    #[test]
    fn duplicate_services_fail() {
        let mut config = DockyardConfig::default();
        config.services = vec![
            ServiceSelection {
                name: "redis".to_string(),
                ..Default::default()
            },
            ServiceSelection {
                name: "redis".to_string(),
                ..Default::default()
            },
        ];
        let messages = messages(&config);
        assert!(messages.iter().any(|m| m.contains("duplicate service `redis`")));
    }

    #[test]
    fn zero_port_fails() {
        let mut config = DockyardConfig::default();
        config.services = vec![ServiceSelection {
            name: "redis".to_string(),
            ports: Some(vec![0]),
            ..Default::default()
        }];
        assert!(messages(&config)[0].contains("port 0"));
    }

    #[test]
    fn proxy_network_only_required_with_proxy() {
        let mut config = DockyardConfig::default();
        config.project.proxy_network = String::new();
        assert!(validate_config(&config).is_err());
        config.project.proxy = false;
        assert!(validate_config(&config).is_ok());
    }
}
