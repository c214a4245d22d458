// src/catalog/mod.rs

//! Library catalog
//!
//! Installed packages describe themselves in `meta/libraries.json` (or the
//! older `.boost`). The catalog collects these descriptions and renders them
//! as `index.html` in the working root.

mod html;

use crate::error::{Error, Result};
use crate::layout::{Layout, LIBS_DIR, SUBLIBS_MARKER};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{error, info, trace, warn};

pub use html::{category_title, render};

const META_FILE: &str = "meta/libraries.json";
const LEGACY_META_FILE: &str = ".boost";

/// One documented library
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub key: String,
    pub name: String,
    /// Package directory relative to the root, `/`-separated
    pub path: String,
    pub description: String,
    pub documentation: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

/// Every library found, plus the category index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Libraries by key
    pub libraries: BTreeMap<String, Library>,
    /// Category id to library keys, in discovery order
    pub categories: BTreeMap<String, Vec<String>>,
}

/// What a rebuild produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub libraries: usize,
    pub categories: usize,
}

/// A metadata field: either a single string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Field {
    One(String),
    Many(Vec<String>),
}

impl Field {
    fn into_list(self) -> Vec<String> {
        match self {
            Field::One(value) => vec![value],
            Field::Many(values) => values,
        }
    }
}

type RawLibrary = BTreeMap<String, Field>;

/// A metadata file holds one library or an array of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetaFile {
    One(RawLibrary),
    Many(Vec<RawLibrary>),
}

impl Catalog {
    /// Scan `libs/` of a working root, following `sublibs` compositions
    ///
    /// A missing `libs/` yields an empty catalog.
    pub fn scan(layout: &Layout) -> Result<Self> {
        let mut catalog = Self::default();

        if layout.libs_dir().is_dir() {
            catalog.scan_dir(layout.root(), LIBS_DIR)?;
        }

        Ok(catalog)
    }

    fn scan_dir(&mut self, root: &Path, dir: &str) -> Result<()> {
        let abs = root.join(dir);
        let mut names: Vec<String> = fs::read_dir(&abs)
            .and_then(|entries| {
                entries
                    .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
                    .collect()
            })
            .map_err(|e| Error::filesystem(&abs, "read error", e))?;
        names.sort();

        for name in names {
            let package = format!("{dir}/{name}");
            let package_dir = root.join(&package);

            if package_dir.is_dir() && has_meta_file(&package_dir) {
                self.add_package(root, &package);
            }

            if package_dir.join(SUBLIBS_MARKER).exists() {
                self.scan_dir(root, &package)?;
            }
        }

        Ok(())
    }

    /// Add every library described by one package; unreadable files are logged
    fn add_package(&mut self, root: &Path, package: &str) {
        let file = meta_file(root, package);
        trace!("reading '{}'", file);

        let raw = match fs::read_to_string(root.join(&file)) {
            Ok(text) => match parse_meta(&text) {
                Ok(raw) => raw,
                Err(e) => {
                    error!("'{}': parse error: {}", file, e);
                    return;
                }
            },
            Err(e) => {
                error!("'{}': read error: {}", file, e);
                return;
            }
        };

        for (index, fields) in raw.into_iter().enumerate() {
            let library = library_from_fields(fields, package, index, &file);

            for category in &library.categories {
                let keys = self.categories.entry(category.clone()).or_default();
                if !keys.contains(&library.key) {
                    keys.push(library.key.clone());
                }
            }

            self.libraries.insert(library.key.clone(), library);
        }
    }
}

/// Rebuild `index.html` from the installed packages
pub fn rebuild(layout: &Layout) -> Result<CatalogSummary> {
    info!("recreating index");

    let catalog = Catalog::scan(layout)?;
    let page = render(&catalog);

    let index = layout.index_file();
    trace!("writing '{}'", index.display());
    fs::write(&index, page).map_err(|e| Error::filesystem(&index, "write error", e))?;

    Ok(CatalogSummary {
        libraries: catalog.libraries.len(),
        categories: catalog.categories.len(),
    })
}

fn has_meta_file(package_dir: &Path) -> bool {
    package_dir.join(META_FILE).exists() || package_dir.join(LEGACY_META_FILE).exists()
}

/// Root-relative metadata file of a package; `.boost` wins when both exist
fn meta_file(root: &Path, package: &str) -> String {
    let modern = root.join(package).join(META_FILE).exists();
    let legacy = root.join(package).join(LEGACY_META_FILE).exists();

    if modern && legacy {
        error!("{} contains both a {} file and a {} file", package, META_FILE, LEGACY_META_FILE);
    }

    if legacy {
        format!("{package}/{LEGACY_META_FILE}")
    } else {
        format!("{package}/{META_FILE}")
    }
}

fn parse_meta(text: &str) -> serde_json::Result<Vec<RawLibrary>> {
    Ok(match serde_json::from_str(text)? {
        MetaFile::One(library) => vec![library],
        MetaFile::Many(libraries) => libraries,
    })
}

/// Build a library from its raw fields; list fields other than authors and
/// category are joined with ", "
fn library_from_fields(mut fields: RawLibrary, package: &str, index: usize, file: &str) -> Library {
    let mut take = |name: &str| fields.remove(name).map(Field::into_list).unwrap_or_default();

    let mut key = take("key").join(", ");
    let name = take("name").join(", ");
    let description = take("description").join(", ");
    let documentation = take("documentation").join(", ");
    let authors = take("authors");
    let categories = take("category");

    if key.is_empty() {
        key = if index == 0 {
            package.to_string()
        } else {
            format!("{}.{}", package, index + 1)
        };
        warn!("'{}': library has no key, assuming '{}'", file, key);
    }

    if name.is_empty() {
        warn!("'{}': library '{}' has no name", file, key);
    }

    Library {
        key,
        name,
        path: package.to_string(),
        description,
        documentation,
        authors,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_meta(root: &Path, package: &str, file: &str, json: &str) {
        let path = root.join(package).join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, json).unwrap();
    }

    #[test]
    fn test_parse_object_and_array() {
        let one = parse_meta(r#"{"key": "any", "name": "Any"}"#).unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_meta(r#"[{"name": "A"}, {"name": "B", "authors": ["x", "y"]}]"#).unwrap();
        assert_eq!(many.len(), 2);

        assert!(parse_meta(r#"{"name": 5}"#).is_err());
    }

    #[test]
    fn test_missing_keys_are_derived_from_path() {
        let temp = TempDir::new().unwrap();
        write_meta(
            temp.path(),
            "libs/functional",
            META_FILE,
            r#"[{"name": "Functional"}, {"name": "Hash", "key": "functional/hash"}, {"name": "Factory"}]"#,
        );

        let catalog = Catalog::scan(&Layout::new(temp.path())).unwrap();
        let keys: Vec<_> = catalog.libraries.keys().cloned().collect();
        assert_eq!(keys, vec!["functional/hash", "libs/functional", "libs/functional.3"]);
        assert_eq!(catalog.libraries["libs/functional"].path, "libs/functional");
    }

    #[test]
    fn test_authors_string_or_list() {
        let temp = TempDir::new().unwrap();
        write_meta(
            temp.path(),
            "libs/a",
            META_FILE,
            r#"{"key": "a", "name": "A", "authors": "Someone", "category": ["String", "IO"]}"#,
        );
        write_meta(
            temp.path(),
            "libs/b",
            LEGACY_META_FILE,
            r#"{"key": "b", "name": "B", "authors": ["One", "Two"], "category": ["IO"]}"#,
        );

        let catalog = Catalog::scan(&Layout::new(temp.path())).unwrap();
        assert_eq!(catalog.libraries["a"].authors, vec!["Someone"]);
        assert_eq!(catalog.libraries["b"].authors, vec!["One", "Two"]);
        assert_eq!(catalog.categories["IO"], vec!["a", "b"]);
        assert_eq!(catalog.categories["String"], vec!["a"]);
    }

    #[test]
    fn test_invalid_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_meta(temp.path(), "libs/bad", META_FILE, "{ not json");
        write_meta(temp.path(), "libs/good", META_FILE, r#"{"key": "good", "name": "Good"}"#);

        let catalog = Catalog::scan(&Layout::new(temp.path())).unwrap();
        assert_eq!(catalog.libraries.len(), 1);
        assert!(catalog.libraries.contains_key("good"));
    }

    #[test]
    fn test_sublibs_are_scanned() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("libs/numeric")).unwrap();
        fs::write(temp.path().join("libs/numeric/sublibs"), b"").unwrap();
        write_meta(
            temp.path(),
            "libs/numeric/ublas",
            META_FILE,
            r#"{"key": "numeric/ublas", "name": "uBLAS"}"#,
        );

        let catalog = Catalog::scan(&Layout::new(temp.path())).unwrap();
        assert_eq!(catalog.libraries["numeric/ublas"].path, "libs/numeric/ublas");
    }

    #[test]
    fn test_rebuild_writes_index() {
        let temp = TempDir::new().unwrap();
        write_meta(
            temp.path(),
            "libs/any",
            META_FILE,
            r#"{"key": "any", "name": "Any", "documentation": "index.html", "category": ["Data"]}"#,
        );

        let layout = Layout::new(temp.path());
        let summary = rebuild(&layout).unwrap();
        assert_eq!(summary, CatalogSummary { libraries: 1, categories: 1 });

        let page = fs::read_to_string(layout.index_file()).unwrap();
        assert!(page.contains("http://www.boost.org/libs/any/index.html"));
        assert!(page.contains("Data Structures"));
    }

    #[test]
    fn test_rebuild_without_libs_writes_empty_index() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path());

        let summary = rebuild(&layout).unwrap();
        assert_eq!(summary, CatalogSummary::default());
        assert!(layout.index_file().exists());
    }
}
