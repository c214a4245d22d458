// src/repository/manifest.rs

//! Dependency manifests
//!
//! `dependencies.txt` lists one module per line followed by its direct
//! dependencies:
//!
//! ```text
//! algorithm -> assert config core
//! numeric~ublas -> config serialization
//! ```
//!
//! `buildable.txt` is a whitespace-separated list of modules that need a
//! separate build step after installation.

use crate::error::{Error, Result};
use crate::layout::module_package;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

use super::PackageSource;

/// Remote file holding module dependencies
pub const DEPENDENCIES_FILE: &str = "dependencies.txt.lzma";

/// Remote file listing buildable modules
pub const BUILDABLE_FILE: &str = "buildable.txt.lzma";

/// Module names, their direct dependencies and the buildable set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyModel {
    deps: BTreeMap<String, Vec<String>>,
    buildable: BTreeSet<String>,
}

impl DependencyModel {
    /// Fetch and parse both manifests from a package source
    pub fn fetch(source: &dyn PackageSource) -> Result<Self> {
        let dependencies = source.fetch_text(DEPENDENCIES_FILE)?;
        let buildable = source.fetch_text(BUILDABLE_FILE)?;

        let model = Self::parse(&dependencies, &buildable, &source.url(DEPENDENCIES_FILE))?;
        debug!(
            "dependency model: {} modules, {} buildable",
            model.deps.len(),
            model.buildable.len()
        );
        Ok(model)
    }

    /// Parse manifest text; `origin` names the dependency manifest in errors
    pub fn parse(dependencies: &str, buildable: &str, origin: &str) -> Result<Self> {
        let mut deps: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for line in dependencies.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.trim().is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();

            let (Some(module), Some("->")) = (tokens.next(), tokens.next()) else {
                return Err(Error::manifest(origin, format!("invalid line: '{line}'")));
            };

            deps.entry(module.to_string())
                .or_default()
                .extend(tokens.map(str::to_string));
        }

        let buildable = buildable.split_whitespace().map(str::to_string).collect();

        Ok(Self { deps, buildable })
    }

    pub fn contains(&self, module: &str) -> bool {
        self.deps.contains_key(module)
    }

    /// Direct dependencies; empty for unknown modules
    pub fn dependencies(&self, module: &str) -> &[String] {
        self.deps.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every module in sorted order
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.deps.keys().map(String::as_str)
    }

    /// Every package, in module order without duplicates
    pub fn packages(&self) -> Vec<&str> {
        let mut packages: Vec<&str> = Vec::new();
        for module in self.modules() {
            let package = module_package(module);
            if packages.last() != Some(&package) {
                packages.push(package);
            }
        }
        packages
    }

    /// True if some module of `package` exists
    pub fn has_package(&self, package: &str) -> bool {
        self.modules().any(|m| module_package(m) == package)
    }

    pub fn is_buildable(&self, module: &str) -> bool {
        self.buildable.contains(module)
    }

    /// Package-level edges `(dependent, dependency)`, one per module edge
    pub fn package_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.deps.iter().flat_map(|(module, deps)| {
            deps.iter()
                .map(move |dep| (module_package(module), module_package(dep)))
        })
    }

    /// Breadth-first install set
    ///
    /// Seeds come first in the given order. When `follow` is set, each
    /// module's direct dependencies are appended in manifest order if not
    /// already present, and the queue is processed to the end. Nothing is
    /// ever reordered or duplicated. Unknown modules stay in the set but
    /// contribute no dependencies.
    pub fn install_closure<I, S>(&self, seeds: I, follow: bool) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queue: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for seed in seeds {
            let seed = seed.into();
            if seen.insert(seed.clone()) {
                queue.push(seed);
            }
        }

        if !follow {
            return queue;
        }

        let mut next = 0;
        while next < queue.len() {
            let deps = self.dependencies(&queue[next]).to_vec();
            next += 1;

            for dep in deps {
                if seen.insert(dep.clone()) {
                    queue.push(dep);
                }
            }
        }

        queue
    }
}
