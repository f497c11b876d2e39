// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dockyard - plugin-driven compose environment generator.
//!
//! This is the binary entry point for the `dockyard` CLI.

mod catalog;
mod generate;
mod project;
mod run;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dockyard_core::{DockyardError, ServiceCategory};

use crate::generate::GenerateArgs;
use crate::project::Project;

/// Dockyard - generate docker-compose environments from plugin-provided services.
#[derive(Parser, Debug)]
#[command(name = "dockyard", version, about, long_about = None)]
struct Cli {
    /// Project file to load instead of ./dockyard.toml.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log level for Dockyard crates. `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List services in the catalog.
    List {
        /// Only show services of this category.
        #[arg(long)]
        category: Option<ServiceCategory>,
    },
    /// Show a service's ports, template, and config options.
    Info {
        /// Catalog name of the service.
        service: String,
    },
    /// List registered plugins.
    Plugins,
    /// Write the compose manifest for the project.
    Generate(GenerateArgs),
    /// Print the plan of a plugin-provided command.
    Run {
        /// Command name, e.g. `db:dump`.
        command: String,
        /// Arguments passed to the command.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let use_color = !cli.plain && std::io::stdout().is_terminal();

    let loaded = match cli.config.as_deref() {
        Some(path) => dockyard_config::load_and_validate_from_path(path),
        None => dockyard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            dockyard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let root = project::project_root(cli.config.as_deref());
    let result = Project::open(config, root)
        .and_then(|project| execute(cli.command, &project, use_color));
    if let Err(e) = result {
        report(&e, use_color);
        std::process::exit(1);
    }
}

fn execute(command: Commands, project: &Project, use_color: bool) -> Result<(), DockyardError> {
    match command {
        Commands::List { category } => {
            catalog::run_list(&project.catalog(), category, use_color);
            Ok(())
        }
        Commands::Info { service } => catalog::run_info(&project.catalog(), &service, use_color),
        Commands::Plugins => {
            catalog::run_plugins(&project.registry, use_color);
            Ok(())
        }
        Commands::Generate(args) => generate::run_generate(project, &args, use_color),
        Commands::Run { command, args } => run::run_command(project, &command, &args),
    }
}

fn report(error: &DockyardError, use_color: bool) {
    if use_color {
        use colored::Colorize;
        eprintln!("{} {error}", "error:".red().bold());
    } else {
        eprintln!("error: {error}");
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dockyard={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
