// src/commands/install.rs
//! Module installation command

use super::open_repository;
use anyhow::Result;
use bpm::{InstallOptions, InstallSelection, Installer, Layout};
use std::path::Path;
use tracing::debug;

/// Install modules (or a state-based selection) and their dependencies
pub fn cmd_install(
    layout: &Layout,
    config: Option<&Path>,
    options: InstallOptions,
    selection: InstallSelection,
) -> Result<()> {
    let (repository, model) = open_repository(layout.root(), config)?;

    let installer = Installer::new(layout, &repository, &model, options);
    let report = installer.run(&selection)?;

    debug!(
        "{} installed, {} already installed, {} unknown",
        report.installed.len(),
        report.already_installed.len(),
        report.unknown.len()
    );

    Ok(())
}
