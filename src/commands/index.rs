// src/commands/index.rs
//! Catalog command

use anyhow::Result;
use bpm::{catalog, Layout};
use tracing::debug;

/// Recreate `index.html` from the installed packages' metadata
pub fn cmd_index(layout: &Layout) -> Result<()> {
    let summary = catalog::rebuild(layout)?;
    debug!("{} libraries in {} categories", summary.libraries, summary.categories);
    Ok(())
}
