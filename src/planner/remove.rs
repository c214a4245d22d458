// src/planner/remove.rs

//! Dependency-safe package removal
//!
//! A package may only be removed when no other installed package depends
//! on it, unless removal is forced. With cascading enabled, the dependents
//! of every removed package are queued for removal as well.

use crate::catalog;
use crate::error::{Error, Result};
use crate::filesystem::{remove_files, remove_tree, LogReporter};
use crate::headers;
use crate::layout::{Layout, BUILD_PACKAGE};
use crate::repository::DependencyModel;
use std::collections::BTreeSet;
use std::fs;
use tracing::{debug, info, warn};

/// Flags of the `remove` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Only report what would be removed
    pub dry_run: bool,
    /// Skip the dependent check
    pub force: bool,
    /// Also remove packages depending on removed ones
    pub cascade: bool,
}

/// How the removal queue is seeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveSelection {
    Packages(Vec<String>),
    /// Every package in the manifest plus the build tool
    All,
    /// Packages present on disk without an install marker
    Partial,
}

/// What a removal run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveReport {
    /// Final removal queue, in processing order
    pub queue: Vec<String>,
    pub removed: Vec<String>,
    /// Dry run only
    pub would_remove: Vec<String>,
    /// Package directory was already absent
    pub already_removed: Vec<String>,
    /// Names that are neither manifest packages nor the build tool
    pub unknown: Vec<String>,
    pub headers_rebuilt: bool,
}

/// Drives removal of installed packages
pub struct Remover<'a> {
    layout: &'a Layout,
    model: &'a DependencyModel,
    options: RemoveOptions,
}

impl<'a> Remover<'a> {
    /// Validate the option combination
    pub fn new(layout: &'a Layout, model: &'a DependencyModel, options: RemoveOptions) -> Result<Self> {
        if options.cascade && !options.force && !options.dry_run {
            return Err(Error::Usage("remove option -d requires -f".to_string()));
        }

        Ok(Self {
            layout,
            model,
            options,
        })
    }

    /// Initial removal queue for a selection
    pub fn seeds(&self, selection: &RemoveSelection) -> Result<Vec<String>> {
        let packages = match selection {
            RemoveSelection::Packages(packages) => packages.clone(),
            RemoveSelection::All => {
                if !self.options.force && !self.options.dry_run {
                    return Err(Error::Usage("remove option -a requires -f".to_string()));
                }
                let mut all: Vec<String> =
                    self.model.packages().into_iter().map(str::to_string).collect();
                all.push(BUILD_PACKAGE.to_string());
                all
            }
            RemoveSelection::Partial => {
                let mut partial: Vec<String> = self
                    .model
                    .packages()
                    .into_iter()
                    .filter(|p| self.layout.is_package_partial(p))
                    .map(str::to_string)
                    .collect();
                if self.layout.is_package_partial(BUILD_PACKAGE) {
                    partial.push(BUILD_PACKAGE.to_string());
                }
                partial
            }
        };

        let mut queue: Vec<String> = Vec::new();
        for package in packages {
            if !queue.contains(&package) {
                queue.push(package);
            }
        }
        Ok(queue)
    }

    /// Installed packages, not in `queue`, with a module depending on `package`
    ///
    /// A package without an install marker has no dependents.
    pub fn dependents(&self, package: &str, queue: &[String]) -> BTreeSet<String> {
        if !self.layout.is_package_installed(package) {
            return BTreeSet::new();
        }

        self.model
            .package_edges()
            .filter(|(_, dependency)| *dependency == package)
            .map(|(dependent, _)| dependent)
            .filter(|dependent| !queue.iter().any(|q| q.as_str() == *dependent))
            .filter(|dependent| self.layout.is_package_installed(dependent))
            .map(str::to_string)
            .collect()
    }

    /// Remove the selection
    ///
    /// Fails without touching the disk when a queued package still has
    /// dependents and removal is not forced.
    pub fn run(&self, selection: &RemoveSelection) -> Result<RemoveReport> {
        let mut report = RemoveReport::default();

        let mut queue = Vec::new();
        for package in self.seeds(selection)? {
            if package == BUILD_PACKAGE || self.model.has_package(&package) {
                queue.push(package);
            } else {
                warn!("package '{}' does not exist", package);
                report.unknown.push(package);
            }
        }

        if !self.options.force && !(self.options.dry_run && self.options.cascade) {
            for package in &queue {
                let dependents = self.dependents(package, &queue);
                if !dependents.is_empty() {
                    return Err(Error::BlockedByDependents {
                        package: package.clone(),
                        dependents: dependents.into_iter().collect(),
                    });
                }
            }
        }

        let mut next = 0;
        while next < queue.len() {
            let package = queue[next].clone();
            next += 1;

            // Computed before removal deletes the marker
            let dependents = self.dependents(&package, &queue);

            self.remove_package(&package, &mut report);

            if self.options.cascade {
                for dependent in dependents {
                    if !queue.contains(&dependent) {
                        debug!("queueing dependent package '{}'", dependent);
                        queue.push(dependent);
                    }
                }
            }
        }

        report.queue = queue;

        if !report.removed.is_empty() {
            headers::rebuild(self.layout)?;
            catalog::rebuild(self.layout)?;
            report.headers_rebuilt = true;
        }

        Ok(report)
    }

    fn remove_package(&self, package: &str, report: &mut RemoveReport) {
        let target = self.layout.package_target(package);
        let dir = self.layout.resolve(&target.dir);

        if !dir.exists() {
            debug!("package '{}' has already been removed", package);
            report.already_removed.push(package.to_string());
            return;
        }

        if self.options.dry_run {
            info!("would have removed package '{}'", package);
            report.would_remove.push(package.to_string());
            return;
        }

        info!("removing package '{}'", package);

        let _ = fs::remove_file(self.layout.resolve(target.marker()));

        if let Err(e) = remove_tree(&dir, &mut LogReporter) {
            warn!("package '{}' was not removed completely: {}", package, e);
        }

        if let Err(e) = remove_files(
            self.layout.root(),
            target.whitelist.iter().map(String::as_str),
            &mut LogReporter,
        ) {
            warn!("package '{}' was not removed completely: {}", package, e);
        }

        report.removed.push(package.to_string());
    }
}
