// src/filesystem/link.rs

//! File and directory links for the unified include tree
//!
//! Links are created with targets relative to the link's own directory so
//! that the working root can be moved. Where symbolic links are unavailable
//! file links fall back to hard links.
//!
//! Directory links have no fallback. On Windows they need symlink privilege;
//! directory junctions are not created.

use crate::error::{Error, Result};
use std::io;
use std::path::Path;
use tracing::debug;

use super::path::relative_link_target;

/// Link `root/link` to the file `root/target`
pub fn link_file(root: &Path, link: &Path, target: &Path) -> Result<()> {
    let relative = relative_link_target(link, target);
    let link_path = root.join(link);

    debug!("linking '{}' to '{}'", link.display(), target.display());

    create_file_link(&relative, &link_path)
        .or_else(|_| std::fs::hard_link(root.join(target), &link_path))
        .map_err(|e| Error::filesystem(link, "link create error", e))
}

/// Link `root/link` to the directory `root/target`
pub fn link_dir(root: &Path, link: &Path, target: &Path) -> Result<()> {
    let relative = relative_link_target(link, target);
    let link_path = root.join(link);

    debug!("linking '{}' to '{}'", link.display(), target.display());

    create_dir_link(&relative, &link_path)
        .map_err(|e| Error::filesystem(link, "link create error", e))
}

/// True if `path` is a symbolic link (not followed)
pub fn is_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(unix)]
fn create_file_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(unix)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_file_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_file_link(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

#[cfg(not(any(unix, windows)))]
fn create_dir_link(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}
