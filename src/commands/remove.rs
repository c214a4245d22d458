// src/commands/remove.rs
//! Package removal command

use super::open_repository;
use anyhow::Result;
use bpm::{Layout, RemoveOptions, RemoveSelection, Remover};
use std::path::Path;
use tracing::debug;

/// Remove packages, refusing while installed packages depend on them
pub fn cmd_remove(
    layout: &Layout,
    config: Option<&Path>,
    options: RemoveOptions,
    selection: RemoveSelection,
) -> Result<()> {
    let (_, model) = open_repository(layout.root(), config)?;

    let remover = Remover::new(layout, &model, options)?;
    let report = remover.run(&selection)?;

    debug!(
        "{} removed, {} already removed, {} unknown",
        report.removed.len(),
        report.already_removed.len(),
        report.unknown.len()
    );

    Ok(())
}
