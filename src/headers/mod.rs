// src/headers/mod.rs

//! Unified include tree
//!
//! Every installed package keeps its headers under `libs/<pkg>/include`.
//! The unified tree at `include/` exposes all of them at once:
//!
//! - a directory contributed by exactly one package becomes a single
//!   directory link, which also covers everything beneath it
//! - a directory contributed by several packages becomes a real directory
//!   holding links to each contributor's files; its subdirectories are
//!   resolved by the same rule
//!
//! The tree is rebuilt from scratch on every call.

use crate::error::{Error, Result};
use crate::filesystem::{self, link_dir, link_file, remove_tree, LogReporter};
use crate::layout::{Layout, AGGREGATE_LINK, AGGREGATE_TARGET, INCLUDE_DIR, LIBS_DIR, SUBLIBS_MARKER};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Unified path (relative to `include/`) to contributing source directories
/// (relative to the root)
///
/// `PathBuf` orders component-wise, so the descendants of a key are exactly
/// the keys that follow it and start with it.
type PendingMap = BTreeMap<PathBuf, Vec<PathBuf>>;

/// What a rebuild produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderSummary {
    pub directory_links: usize,
    pub merged_directories: usize,
    pub file_links: usize,
    /// The aggregate `boost` link was created
    pub aggregate_linked: bool,
}

/// Rebuild `include/` from every installed package
pub fn rebuild(layout: &Layout) -> Result<HeaderSummary> {
    info!("recreating header links");

    debug!("removing old header links");
    remove_tree(&layout.include_dir(), &mut LogReporter)?;
    remove_tree(&layout.resolve(AGGREGATE_LINK), &mut LogReporter)?;

    let mut summary = HeaderSummary::default();

    if !layout.libs_dir().is_dir() {
        return Ok(summary);
    }

    let mut pending = PendingMap::new();
    scan_packages(layout.root(), Path::new(LIBS_DIR), &mut pending)?;

    if pending.is_empty() {
        return Ok(summary);
    }

    create_directory(layout, Path::new(INCLUDE_DIR))?;

    while let Some((dir, sources)) = pending.pop_first() {
        let unified = Path::new(INCLUDE_DIR).join(&dir);

        if let [source] = sources.as_slice() {
            link_dir(layout.root(), &unified, source)?;
            summary.directory_links += 1;
            retire_descendants(&mut pending, &dir);
        } else {
            create_directory(layout, &unified)?;
            summary.merged_directories += 1;

            for source in &sources {
                summary.file_links += link_files(layout, source, &unified)?;
            }
        }
    }

    filesystem::touch(&layout.headers_marker())?;

    if layout.resolve(AGGREGATE_TARGET).exists() {
        link_dir(layout.root(), Path::new(AGGREGATE_LINK), Path::new(AGGREGATE_TARGET))?;
        summary.aggregate_linked = true;
    }

    debug!(
        "{} directory links, {} merged directories, {} file links",
        summary.directory_links, summary.merged_directories, summary.file_links
    );

    Ok(summary)
}

/// Record every package's include subdirectories, following `sublibs`
fn scan_packages(root: &Path, dir: &Path, pending: &mut PendingMap) -> Result<()> {
    for name in sorted_entries(&root.join(dir))? {
        let package = dir.join(&name);
        let abs = root.join(&package);

        let include = package.join(INCLUDE_DIR);
        if abs.is_dir() && root.join(&include).is_dir() {
            scan_include(root, &include, pending)?;
        }

        if abs.join(SUBLIBS_MARKER).exists() {
            scan_packages(root, &package, pending)?;
        }
    }

    Ok(())
}

/// Record each directory below `include` under its path relative to it
fn scan_include(root: &Path, include: &Path, pending: &mut PendingMap) -> Result<()> {
    let base = root.join(include);

    let walker = WalkDir::new(&base)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(&base).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            Error::filesystem(path, "read error", source)
        })?;

        if !entry.file_type().is_dir() {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(&base) {
            pending
                .entry(relative.to_path_buf())
                .or_default()
                .push(include.join(relative));
        }
    }

    Ok(())
}

/// Drop every pending key strictly below `dir`
fn retire_descendants(pending: &mut PendingMap, dir: &Path) {
    let covered: Vec<PathBuf> = pending
        .range::<Path, _>((std::ops::Bound::Excluded(dir), std::ops::Bound::Unbounded))
        .map(|(key, _)| key)
        .take_while(|key| key.starts_with(dir))
        .cloned()
        .collect();

    for key in covered {
        pending.remove(&key);
    }
}

/// Link the files (not subdirectories) of `source` into `unified`
fn link_files(layout: &Layout, source: &Path, unified: &Path) -> Result<usize> {
    let mut linked = 0;

    for name in sorted_entries(&layout.resolve(source))? {
        let from = source.join(&name);

        if layout.resolve(&from).is_dir() {
            continue;
        }

        link_file(layout.root(), &unified.join(&name), &from)?;
        linked += 1;
    }

    Ok(linked)
}

fn create_directory(layout: &Layout, dir: &Path) -> Result<()> {
    debug!("creating '{}'", dir.display());
    let path = layout.resolve(dir);
    fs::create_dir(&path).map_err(|e| Error::filesystem(dir, "create error", e))
}

fn sorted_entries(dir: &Path) -> Result<Vec<std::ffi::OsString>> {
    let mut names = fs::read_dir(dir)
        .and_then(|entries| entries.map(|e| e.map(|e| e.file_name())).collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| Error::filesystem(dir, "read error", e))?;
    names.sort();
    Ok(names)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::filesystem::is_link;
    use tempfile::TempDir;

    fn add_header(layout: &Layout, package_dir: &str, relative: &str) {
        let path = layout.resolve(package_dir).join("include").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_retire_descendants_is_component_wise() {
        let mut pending = PendingMap::new();
        for key in ["a", "a/b", "a/b/c", "a-x", "ab", "b"] {
            pending.insert(PathBuf::from(key), vec![]);
        }
        pending.remove(Path::new("a"));

        retire_descendants(&mut pending, Path::new("a"));

        let left: Vec<_> = pending.keys().map(|k| k.to_string_lossy().into_owned()).collect();
        assert_eq!(left, vec!["a-x", "ab", "b"]);
    }

    #[test]
    fn test_single_source_becomes_directory_link() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());
        add_header(&layout, "libs/x", "x/one.hpp");
        add_header(&layout, "libs/x", "x/detail/two.hpp");

        let summary = rebuild(&layout).unwrap();

        assert_eq!(summary.directory_links, 1);
        assert_eq!(summary.merged_directories, 0);
        assert!(is_link(&temp.path().join("include/x")));
        assert_eq!(
            fs::read_link(temp.path().join("include/x")).unwrap(),
            PathBuf::from("../libs/x/include/x")
        );
        assert!(temp.path().join("include/x/detail/two.hpp").exists());
        assert!(temp.path().join("include/.updated").exists());
    }

    #[test]
    fn test_shared_directory_is_merged() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());
        add_header(&layout, "libs/p", "a/b/p.hpp");
        add_header(&layout, "libs/q", "a/b/q.hpp");
        add_header(&layout, "libs/q", "a/b/only_q/deep.hpp");

        let summary = rebuild(&layout).unwrap();

        let merged = temp.path().join("include/a/b");
        assert!(!is_link(&temp.path().join("include/a")));
        assert!(!is_link(&merged));
        assert!(merged.is_dir());
        assert!(is_link(&merged.join("p.hpp")));
        assert!(is_link(&merged.join("q.hpp")));
        assert_eq!(fs::read_to_string(merged.join("p.hpp")).unwrap(), "a/b/p.hpp");
        assert!(is_link(&merged.join("only_q")));
        assert!(merged.join("only_q/deep.hpp").exists());

        assert_eq!(summary.merged_directories, 2);
        assert_eq!(summary.directory_links, 1);
        assert_eq!(summary.file_links, 2);
    }

    #[test]
    fn test_files_directly_in_include_are_ignored() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());
        add_header(&layout, "libs/x", "top.hpp");
        add_header(&layout, "libs/x", "x/one.hpp");

        rebuild(&layout).unwrap();
        assert!(!temp.path().join("include/top.hpp").exists());
    }

    #[test]
    fn test_sublibs_are_scanned() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());
        fs::create_dir_all(temp.path().join("libs/numeric")).unwrap();
        fs::write(temp.path().join("libs/numeric/sublibs"), b"").unwrap();
        add_header(&layout, "libs/numeric/ublas", "boost/numeric/ublas/vector.hpp");
        add_header(&layout, "libs/config", "boost/config.hpp");

        let summary = rebuild(&layout).unwrap();

        assert!(summary.aggregate_linked);
        assert!(temp.path().join("include/boost/numeric/ublas/vector.hpp").exists());
        assert!(temp.path().join("include/boost/config.hpp").exists());
        assert!(is_link(&temp.path().join("boost")));
        assert!(temp.path().join("boost/config.hpp").exists());
    }

    #[test]
    fn test_rebuild_replaces_previous_tree() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());
        add_header(&layout, "libs/x", "x/one.hpp");
        add_header(&layout, "libs/y", "y/two.hpp");
        rebuild(&layout).unwrap();

        fs::remove_dir_all(temp.path().join("libs/y")).unwrap();
        rebuild(&layout).unwrap();

        assert!(temp.path().join("include/x").exists());
        assert!(fs::symlink_metadata(temp.path().join("include/y")).is_err());
        assert!(temp.path().join("libs/x/include/x/one.hpp").exists());
    }

    #[test]
    fn test_no_headers_leaves_no_tree() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());
        fs::create_dir_all(temp.path().join("libs/empty")).unwrap();

        let summary = rebuild(&layout).unwrap();
        assert_eq!(summary, HeaderSummary::default());
        assert!(!temp.path().join("include").exists());
    }
}
