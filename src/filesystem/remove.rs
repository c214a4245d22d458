// src/filesystem/remove.rs

//! Scoped recursive removal with per-path reporting
//!
//! Used for rolling back partial installations, removing packages and
//! clearing the unified include tree. Symbolic links are removed, never
//! followed, so clearing `include/` cannot reach into `libs/`.

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{trace, warn};
use walkdir::WalkDir;

/// Receives progress from [`remove_tree`]
pub trait RemovalReporter {
    /// Called before each path is removed
    fn removing(&mut self, path: &Path);

    /// Called when removing a path failed; removal continues
    fn failed(&mut self, path: &Path, error: &io::Error);
}

/// Reports through `tracing`: paths at trace level, failures as warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl RemovalReporter for LogReporter {
    fn removing(&mut self, path: &Path) {
        trace!("removing '{}'", path.display());
    }

    fn failed(&mut self, path: &Path, error: &io::Error) {
        warn!("'{}': remove error: {}", path.display(), error);
    }
}

/// Remove `path` and everything beneath it
///
/// Children are removed before their parents. Every path is reported before
/// the attempt; a failure is reported and the walk continues. The last
/// failure, if any, is returned. A missing `path` is not an error.
pub fn remove_tree(path: &Path, reporter: &mut dyn RemovalReporter) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::filesystem(path, "remove error", e)),
    };

    if !metadata.is_dir() {
        reporter.removing(path);
        return remove_entry(path, false).map_err(|e| {
            reporter.failed(path, &e);
            Error::filesystem(path, "remove error", e)
        });
    }

    let mut last_error = None;

    let walker = WalkDir::new(path)
        .contents_first(true)
        .follow_links(false)
        .follow_root_links(false);

    for entry in walker {
        let (entry_path, is_dir) = match entry {
            Ok(entry) => (entry.path().to_path_buf(), entry.file_type().is_dir()),
            Err(e) => {
                let failed_path = e.path().unwrap_or(path).to_path_buf();
                let io_error = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop"));
                reporter.failed(&failed_path, &io_error);
                last_error = Some(Error::filesystem(failed_path, "remove error", io_error));
                continue;
            }
        };

        reporter.removing(&entry_path);

        if let Err(e) = remove_entry(&entry_path, is_dir) {
            reporter.failed(&entry_path, &e);
            last_error = Some(Error::filesystem(&entry_path, "remove error", e));
        }
    }

    last_error.map_or(Ok(()), Err)
}

/// Remove single files relative to `root`, reporting like [`remove_tree`]
///
/// Missing files are skipped. Returns the last failure.
pub fn remove_files<'a>(
    root: &Path,
    files: impl IntoIterator<Item = &'a str>,
    reporter: &mut dyn RemovalReporter,
) -> Result<()> {
    let mut last_error = None;

    for file in files {
        let path = root.join(file);

        if fs::symlink_metadata(&path).is_err() {
            continue;
        }

        reporter.removing(&path);

        if let Err(e) = remove_entry(&path, false) {
            reporter.failed(&path, &e);
            last_error = Some(Error::filesystem(&path, "remove error", e));
        }
    }

    last_error.map_or(Ok(()), Err)
}

fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        return fs::remove_dir(path);
    }

    match fs::remove_file(path) {
        // Directory symlinks on Windows need remove_dir
        Err(e) if cfg!(windows) && path.is_dir() => fs::remove_dir(path).or(Err(e)),
        other => other,
    }
}
