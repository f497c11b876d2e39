// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dockyard run`: print the plan of a plugin-provided command.
//!
//! Plans are not executed here; each step is printed as a shell line.

use dockyard_core::DockyardError;
use dockyard_plugin::{Catalog, CommandContext, CommandPlan};

use crate::project::Project;

const COMMAND_SUGGESTION_THRESHOLD: f64 = 0.8;

pub fn run_command(project: &Project, name: &str, args: &[String]) -> Result<(), DockyardError> {
    let catalog = project.catalog();
    let plan = plan_command(project, &catalog, name, args)?;
    for step in &plan.steps {
        println!("{}", step.display_line());
    }
    Ok(())
}

/// Build the plan for `name` against the project's resolved configuration.
pub fn plan_command(
    project: &Project,
    catalog: &Catalog,
    name: &str,
    args: &[String],
) -> Result<CommandPlan, DockyardError> {
    let command = catalog
        .command(name)
        .ok_or_else(|| unknown_command(catalog, name))?;
    let resolved = project.resolve(catalog, false, false)?;
    let ctx = CommandContext {
        configuration: &resolved.configuration,
        catalog,
        args,
    };
    command
        .plan(&ctx)
        .map_err(|e| DockyardError::Config(format!("`{name}`: {e}")))
}

fn unknown_command(catalog: &Catalog, name: &str) -> DockyardError {
    let closest = catalog
        .commands()
        .iter()
        .map(|e| (strsim::jaro_winkler(name, &e.command.name), &e.command.name))
        .filter(|(score, _)| *score > COMMAND_SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0));
    match closest {
        Some((_, suggestion)) => {
            DockyardError::Config(format!("unknown command `{name}` (did you mean `{suggestion}`?)"))
        }
        None => DockyardError::Config(format!("unknown command `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard_config::load_and_validate_str;
    use dockyard_plugin::Plugin;
    use dockyard_test_utils::TestPlugin;
    use std::path::PathBuf;

    fn shop() -> Project {
        let config = load_and_validate_str(
            r#"
[project]
name = "shop"

[[services]]
name = "postgres"
config = { POSTGRES_USER = "shop", POSTGRES_DB = "orders" }
"#,
        )
        .unwrap();
        Project::open(config, PathBuf::from(".")).unwrap()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn dump_plan_uses_project_config() {
        let project = shop();
        let catalog = project.catalog();
        let plan = plan_command(&project, &catalog, "db:dump", &args(&["postgres"])).unwrap();
        assert_eq!(
            plan.steps[0].display_line(),
            "docker compose -p shop exec -T postgres pg_dump -U shop -d orders > postgres.sql"
        );
    }

    #[test]
    fn command_errors_are_reported() {
        let project = shop();
        let catalog = project.catalog();
        let err = plan_command(&project, &catalog, "db:restore", &args(&["postgres"])).unwrap_err();
        assert!(err.to_string().contains("db:restore needs a file"));
    }

    #[test]
    fn project_plugin_command_is_planned() {
        let mut project = shop();
        let plugin = TestPlugin::new("tools").with_echo_command("echo:args");
        project.registry.register(&plugin as &dyn Plugin).unwrap();
        let catalog = project.catalog();
        let plan = plan_command(&project, &catalog, "echo:args", &args(&["a", "b"])).unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].display_line(), "echo a b");
    }

    #[test]
    fn unknown_command_suggests_closest() {
        let project = shop();
        let catalog = project.catalog();
        let err = plan_command(&project, &catalog, "db:dmp", &[]).unwrap_err();
        assert!(err.to_string().contains("did you mean `db:dump`?"));
    }
}
