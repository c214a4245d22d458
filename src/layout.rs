// src/layout.rs

//! On-disk layout of a working root
//!
//! ```text
//! <root>/
//!   libs/<package>/            installed package trees
//!   libs/<package>/.installed  install marker
//!   tools/build/               build-tool package
//!   include/                   unified include tree
//!   include/.updated           freshness marker of the include tree
//!   boost                      aggregate link to include/boost
//!   index.html                 catalog page
//! ```
//!
//! Paths handed to the extractor and to the link helpers are relative to the
//! root; [`Layout::resolve`] turns them into real paths.

use std::path::{Path, PathBuf};

/// Separator between a package name and a sub-module name (`foo~sub`)
pub const MODULE_SEPARATOR: char = '~';

/// Name of the build-tool module and package
pub const BUILD_PACKAGE: &str = "build";

/// Files the build-tool package may place outside its own directory
pub const BUILD_WHITELIST: &[&str] = &[
    "b2.exe",
    "boost-build.jam",
    "boostcpp.jam",
    "Jamroot",
    "libs/Jamfile.v2",
];

/// Install marker file name inside a package directory
pub const INSTALL_MARKER: &str = ".installed";

/// Marker that turns a package directory into a collection of sub-packages
pub const SUBLIBS_MARKER: &str = "sublibs";

pub const LIBS_DIR: &str = "libs";
pub const TOOLS_DIR: &str = "tools";
pub const INCLUDE_DIR: &str = "include";
pub const HEADERS_MARKER: &str = "include/.updated";
pub const AGGREGATE_LINK: &str = "boost";
pub const AGGREGATE_TARGET: &str = "include/boost";
pub const INDEX_FILE: &str = "index.html";

/// Package owning a module: everything before the first `~`
pub fn module_package(module: &str) -> &str {
    module
        .split_once(MODULE_SEPARATOR)
        .map_or(module, |(package, _)| package)
}

/// Where a package is extracted, plus the files it may install elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTarget {
    /// Package directory relative to the root, without a trailing slash
    pub dir: PathBuf,
    /// Exact root-relative paths allowed outside `dir`
    pub whitelist: Vec<String>,
}

impl PackageTarget {
    /// Extraction prefix as it appears in archive entry names (`libs/foo/`)
    pub fn prefix(&self) -> String {
        format!("{}/", self.dir.to_string_lossy())
    }

    /// Marker path relative to the root
    pub fn marker(&self) -> PathBuf {
        self.dir.join(INSTALL_MARKER)
    }
}

/// A working root and the paths derived from it
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a root-relative path onto the root
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn libs_dir(&self) -> PathBuf {
        self.resolve(LIBS_DIR)
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.resolve(TOOLS_DIR)
    }

    pub fn include_dir(&self) -> PathBuf {
        self.resolve(INCLUDE_DIR)
    }

    pub fn headers_marker(&self) -> PathBuf {
        self.resolve(HEADERS_MARKER)
    }

    pub fn index_file(&self) -> PathBuf {
        self.resolve(INDEX_FILE)
    }

    /// Installation target of a package; `build` goes to `tools/build`
    pub fn package_target(&self, package: &str) -> PackageTarget {
        if package == BUILD_PACKAGE {
            PackageTarget {
                dir: Path::new(TOOLS_DIR).join(BUILD_PACKAGE),
                whitelist: BUILD_WHITELIST.iter().map(|s| s.to_string()).collect(),
            }
        } else {
            PackageTarget {
                dir: Path::new(LIBS_DIR).join(package),
                whitelist: Vec::new(),
            }
        }
    }

    /// Absolute package directory
    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.resolve(self.package_target(package).dir)
    }

    /// Absolute install marker path
    pub fn package_marker(&self, package: &str) -> PathBuf {
        self.resolve(self.package_target(package).marker())
    }

    pub fn is_package_installed(&self, package: &str) -> bool {
        self.package_marker(package).exists()
    }

    /// Directory present but marker absent
    pub fn is_package_partial(&self, package: &str) -> bool {
        self.package_dir(package).exists() && !self.is_package_installed(package)
    }

    /// Absolute module directory: `foo~sub` lives at `libs/foo/sub`
    pub fn module_dir(&self, module: &str) -> PathBuf {
        let relative = module.replace(MODULE_SEPARATOR, "/");
        self.libs_dir().join(relative)
    }
}
