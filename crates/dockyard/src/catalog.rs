// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dockyard list`, `dockyard info`, and `dockyard plugins`.

use colored::Colorize;
use dockyard_core::{value_to_env_string, DockyardError, ServiceCategory};
use dockyard_plugin::{Catalog, Field, PluginRegistry, ServiceEntry, REDACTED};
use strum::IntoEnumIterator;

/// Print the catalog grouped by category.
pub fn run_list(catalog: &Catalog, category: Option<ServiceCategory>, use_color: bool) {
    println!();
    println!("  dockyard services");
    println!("  {}", "-".repeat(50));

    for cat in ServiceCategory::iter().filter(|c| category.is_none_or(|only| only == *c)) {
        let entries = catalog.services_in(cat);
        if entries.is_empty() {
            continue;
        }
        if use_color {
            println!("  {}", cat.to_string().bold());
        } else {
            println!("  {cat}");
        }
        for entry in entries {
            println!("    {}", service_line(entry));
        }
    }
    println!();
}

/// One catalog row: icon, name, display name, host ports.
pub fn service_line(entry: &ServiceEntry) -> String {
    let def = &entry.definition;
    let icon = if def.icon().is_empty() { " " } else { def.icon() };
    let ports = def
        .ports()
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let mut line = format!("{icon} {:<14} {:<20}", def.name(), def.display_name());
    if !ports.is_empty() {
        line.push_str(&format!(" [{ports}]"));
    }
    if !entry.shadowed.is_empty() {
        line.push_str(&format!(" (from {})", entry.plugin));
    }
    line.trim_end().to_string()
}

/// Print one service's details.
pub fn run_info(catalog: &Catalog, name: &str, use_color: bool) -> Result<(), DockyardError> {
    let entry = catalog
        .service_entry(name)
        .ok_or_else(|| DockyardError::ServiceNotFound {
            name: name.to_string(),
            suggestion: catalog.suggest_service(name),
        })?;

    println!();
    for line in describe(catalog, entry) {
        if use_color && line.starts_with("  ") && !line.starts_with("    ") {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }
    println!();
    Ok(())
}

/// Detail lines for `info`. Secret defaults are masked.
pub fn describe(catalog: &Catalog, entry: &ServiceEntry) -> Vec<String> {
    let def = &entry.definition;
    let mut lines = vec![
        format!("  {} ({})", def.display_name(), def.name()),
        format!("    {}", def.description()),
        format!("    category:  {}", def.category()),
        format!("    plugin:    {}", entry.plugin),
    ];
    if !entry.shadowed.is_empty() {
        lines.push(format!("    overrides: {}", entry.shadowed.join(", ")));
    }
    lines.push(format!(
        "    template:  {}",
        catalog.resolve_template(def).display()
    ));

    if !def.ports().is_empty() {
        let mappings = def
            .ports()
            .iter()
            .zip(def.internal_ports())
            .map(|(host, container)| format!("{host}:{container}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("    ports:     {mappings}"));
    }
    if let Some(port) = def.http_port() {
        lines.push(format!("    http:      container port {port} behind the proxy"));
    }
    if let Some(hc) = def.health_check() {
        lines.push(format!("    health:    {}", hc.test.join(" ")));
    }

    if let Some(schema) = def.schema().filter(|s| !s.is_empty()) {
        lines.push(String::new());
        lines.push("  Config".to_string());
        for field in schema.fields() {
            lines.push(format!("    {}", field_line(field)));
        }
    }
    lines
}

fn field_line(field: &Field) -> String {
    let default = if field.secret {
        REDACTED.to_string()
    } else {
        value_to_env_string(&field.default)
    };
    let mut line = format!(
        "{:<24} {:<8} default: {default}",
        field.key,
        field.field_type.to_string()
    );
    match (field.min, field.max) {
        (Some(min), Some(max)) => line.push_str(&format!("  range: {min}..={max}")),
        (Some(min), None) => line.push_str(&format!("  min: {min}")),
        (None, Some(max)) => line.push_str(&format!("  max: {max}")),
        (None, None) => {}
    }
    if let Some(allowed) = &field.allowed {
        let allowed: Vec<String> = allowed.iter().map(value_to_env_string).collect();
        line.push_str(&format!("  one of: {}", allowed.join(" | ")));
    }
    if let Some(label) = &field.label {
        line.push_str(&format!("  ({label})"));
    }
    line
}

/// Print registered plugins in registration order.
pub fn run_plugins(registry: &PluginRegistry, use_color: bool) {
    println!();
    println!("  dockyard plugins");
    println!("  {}", "-".repeat(50));
    for plugin in registry.plugins() {
        let name = format!("{:<16}", plugin.name);
        if use_color {
            println!(
                "    {} {:<8} {}",
                name.green(),
                plugin.version.to_string(),
                plugin.description
            );
        } else {
            println!("    {name} {:<8} {}", plugin.version.to_string(), plugin.description);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard_plugin::{Plugin, ServiceDefinition};
    use dockyard_test_utils::{bundled_registry, registry_with, TestPlugin};

    #[test]
    fn service_line_shows_ports() {
        let registry = bundled_registry().unwrap();
        let catalog = registry.catalog();
        let line = service_line(catalog.service_entry("minio").unwrap());
        assert!(line.contains("minio"));
        assert!(line.ends_with("[9001, 9000]"));
    }

    #[test]
    fn describe_masks_secret_defaults() {
        let registry = bundled_registry().unwrap();
        let catalog = registry.catalog();
        let lines = describe(&catalog, catalog.service_entry("postgres").unwrap());

        let password = lines
            .iter()
            .find(|l| l.trim_start().starts_with("POSTGRES_PASSWORD"))
            .unwrap();
        assert!(password.contains(REDACTED));
        assert!(!password.contains("default: dockyard"));

        // The health line also mentions POSTGRES_USER; pick the schema row.
        let user = lines
            .iter()
            .find(|l| l.trim_start().starts_with("POSTGRES_USER"))
            .unwrap();
        assert!(user.contains("default: dockyard"));
        assert!(lines.iter().any(|l| l.contains("ports:     5432:5432")));
        assert!(lines.iter().any(|l| l.contains("template:  postgres.yml")));
    }

    #[test]
    fn describe_shows_constraints() {
        let registry = bundled_registry().unwrap();
        let catalog = registry.catalog();
        let lines = describe(&catalog, catalog.service_entry("meilisearch").unwrap());
        let env = lines.iter().find(|l| l.contains("MEILI_ENV")).unwrap();
        assert!(env.contains("one of: development | production"));
    }

    #[test]
    fn overridden_service_names_previous_plugin() {
        let redis = ServiceDefinition::builder("redis", ServiceCategory::Cache)
            .port(6379, 6379)
            .build()
            .unwrap();
        let plugin = TestPlugin::new("valkey").with_service(redis);
        let registry = registry_with(vec![Box::new(plugin) as Box<dyn Plugin>]).unwrap();
        let catalog = registry.catalog();
        let entry = catalog.service_entry("redis").unwrap();

        let lines = describe(&catalog, entry);
        assert!(lines.iter().any(|l| l == "    plugin:    valkey"));
        assert!(lines.iter().any(|l| l == "    overrides: infrastructure"));
        assert!(service_line(entry).ends_with("(from valkey)"));
    }
}
