// src/filesystem/mod.rs

//! Filesystem operations for bpm
//!
//! This module provides:
//! - Entry-name policy and relative link targets ([`path`])
//! - Scoped recursive removal with reporting ([`remove_tree`])
//! - File and directory links ([`link_file`], [`link_dir`])
//! - Marker helpers: touching a file and reading its modification time

mod link;
pub mod path;
mod remove;

pub use link::{is_link, link_dir, link_file};
pub use remove::{remove_files, remove_tree, LogReporter, RemovalReporter};

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::time::SystemTime;

/// Create (or truncate) an empty marker file
pub fn touch(path: &Path) -> Result<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map(drop)
        .map_err(|e| Error::filesystem(path, "create error", e))
}

/// Modification time, or `None` when the path does not exist
pub fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Create a directory with mode 0755; an existing directory is accepted
pub fn create_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder
        .create(path)
        .or_else(|e| if path.is_dir() { Ok(()) } else { Err(e) })
        .map_err(|e| Error::filesystem(path, "create error", e))
}
