// src/filesystem/path.rs

//! Path checks for archive entry names and link targets
//!
//! Entry names come from untrusted archives. They are kept as the `/`
//! separated strings found in the archive until they have passed
//! [`check_entry_name`], and only then joined onto the working root.

use std::path::{Component, Path, PathBuf};

/// Why an entry name was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameViolation {
    /// Neither under the extraction prefix nor whitelisted
    OutsidePrefix,
    /// Contains a `..` segment
    ParentSegment,
}

/// True if any `/` or `\` separated segment of `name` is exactly `..`
///
/// # Examples
///
/// ```
/// use bpm::filesystem::path::has_parent_segment;
///
/// assert!(has_parent_segment("../evil"));
/// assert!(has_parent_segment("libs/foo/../../evil"));
/// assert!(!has_parent_segment("libs/foo/..hidden"));
/// ```
pub fn has_parent_segment(name: &str) -> bool {
    name.split(['/', '\\']).any(|segment| segment == "..")
}

/// Apply the extraction name policy
///
/// A name must start with `prefix` or appear verbatim in `whitelist`, and
/// must not contain a `..` segment anywhere, even after the prefix.
pub fn check_entry_name(
    name: &str,
    prefix: &str,
    whitelist: &[String],
) -> Result<(), NameViolation> {
    if !name.starts_with(prefix) && !whitelist.iter().any(|w| w == name) {
        return Err(NameViolation::OutsidePrefix);
    }

    if has_parent_segment(name) {
        return Err(NameViolation::ParentSegment);
    }

    Ok(())
}

/// Express `target` relative to the directory holding `link`
///
/// Both paths are relative to the same root. Absolute paths are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use bpm::filesystem::path::relative_link_target;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     relative_link_target(Path::new("include/boost/a"), Path::new("libs/a/include/boost/a")),
///     PathBuf::from("../../libs/a/include/boost/a")
/// );
/// assert_eq!(
///     relative_link_target(Path::new("boost"), Path::new("include/boost")),
///     PathBuf::from("include/boost")
/// );
/// ```
pub fn relative_link_target(link: &Path, target: &Path) -> PathBuf {
    if link.is_absolute() || target.is_absolute() {
        return target.to_path_buf();
    }

    let depth = link
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);

    let mut relative = PathBuf::new();
    for _ in 0..depth {
        relative.push("..");
    }
    relative.push(target);
    relative
}
