// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dockyard generate` command implementation.
//!
//! Resolves the project's service selection, runs `before-generate`
//! handlers, renders the manifest, writes it atomically, then runs
//! `after-generate` handlers with the manifest text.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use dockyard_compose::ComposeGenerator;
use dockyard_core::DockyardError;
use dockyard_plugin::{LifecycleContext, LifecycleEvent};
use tracing::info;

use crate::project::Project;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Write the manifest here instead of `project.output`.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Fail instead of moving a service to another host port.
    #[arg(long)]
    pub strict_ports: bool,

    /// Also treat ports already bound on this host as taken.
    #[arg(long)]
    pub check_host_ports: bool,
}

/// Run the `dockyard generate` command.
pub fn run_generate(
    project: &Project,
    args: &GenerateArgs,
    use_color: bool,
) -> Result<(), DockyardError> {
    let output = project.output_path(args.output.as_deref());
    let manifest = generate_manifest(project, args, &output, use_color)?;
    let services = project.config.services.len();

    if use_color {
        use colored::Colorize;
        println!(
            "{} wrote {} ({services} services, {} bytes)",
            "✓".green(),
            output.display().to_string().bold(),
            manifest.len()
        );
    } else {
        println!(
            "wrote {} ({services} services, {} bytes)",
            output.display(),
            manifest.len()
        );
    }
    Ok(())
}

/// Resolve, render, and write; returns the manifest text.
pub fn generate_manifest(
    project: &Project,
    args: &GenerateArgs,
    output: &Path,
    use_color: bool,
) -> Result<String, DockyardError> {
    let catalog = project.catalog();
    let resolved = project.resolve(&catalog, args.check_host_ports, args.strict_ports)?;
    for moved in &resolved.reassignments {
        let notice = format!(
            "{}: port {} is taken, using {}",
            moved.service, moved.requested, moved.assigned
        );
        if use_color {
            use colored::Colorize;
            println!("{} {}", "!".yellow(), notice.yellow());
        } else {
            println!("[WARN] {notice}");
        }
    }

    let configuration = &resolved.configuration;
    project.registry.dispatch(
        LifecycleEvent::BeforeGenerate,
        &LifecycleContext {
            configuration,
            manifest: None,
        },
    )?;

    let manifest = ComposeGenerator::new(catalog)
        .templates(project.template_store())
        .proxy(project.proxy_settings())
        .generate(configuration)?;
    write_atomic(output, &manifest)?;
    info!(path = %output.display(), services = configuration.services.len(), "manifest written");

    project.registry.dispatch(
        LifecycleEvent::AfterGenerate,
        &LifecycleContext {
            configuration,
            manifest: Some(&manifest),
        },
    )?;
    Ok(manifest)
}

/// Replace `path` with `contents` via a temp file in the same directory.
///
/// On failure the previous file is left as it was.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), DockyardError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let io_err = |source: std::io::Error| DockyardError::Io {
        path: path.display().to_string(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644))
            .map_err(io_err)?;
    }

    file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
