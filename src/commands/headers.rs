// src/commands/headers.rs
//! Unified include tree command

use anyhow::Result;
use bpm::{headers, Layout};
use tracing::debug;

/// Recreate `include/` from the installed packages
pub fn cmd_headers(layout: &Layout) -> Result<()> {
    let summary = headers::rebuild(layout)?;

    debug!(
        "{} directory links, {} file links",
        summary.directory_links, summary.file_links
    );

    Ok(())
}
