// src/planner/install.rs

//! Installation planning and execution
//!
//! The install set is a queue seeded from the selection and grown
//! breadth-first with dependencies. Each module is installed by fetching
//! its package archive and extracting it into the package directory; the
//! install marker is written only after extraction succeeds. A failed
//! extraction is rolled back and ends the run.

use crate::archive::Extractor;
use crate::catalog;
use crate::error::Result;
use crate::filesystem::{self, remove_files, remove_tree, LogReporter};
use crate::headers;
use crate::layout::{module_package, Layout, BUILD_PACKAGE};
use crate::repository::{DependencyModel, PackageSource};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use super::selection::{select_modules, ModuleState};

/// Flags of the `install` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// Only report what would be installed
    pub dry_run: bool,
    /// Append dependencies to the install set
    pub follow_dependencies: bool,
    /// Leave partial installations in place instead of removing them
    pub keep_partial: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            follow_dependencies: true,
            keep_partial: false,
        }
    }
}

/// How the initial install set is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSelection {
    /// Explicit module names
    Modules(Vec<String>),
    /// Every module in the manifest
    All,
    /// Modules already fully installed
    Installed,
    /// Modules whose package has no install marker
    Partial,
}

/// What an install run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Final install set, in processing order
    pub install_set: Vec<String>,
    /// Modules installed (or that would have been, in a dry run)
    pub installed: Vec<String>,
    /// Modules whose package marker already existed
    pub already_installed: Vec<String>,
    /// Names not present in the manifest
    pub unknown: Vec<String>,
    /// The build-tool package was installed during this run
    pub build_tool_installed: bool,
    /// Freshly installed modules that need a build step, sorted
    pub needs_build: Vec<String>,
    pub headers_rebuilt: bool,
    pub catalog_rebuilt: bool,
}

impl InstallReport {
    /// Nothing was (or would have been) installed
    pub fn is_noop(&self) -> bool {
        self.installed.is_empty() && !self.build_tool_installed
    }
}

/// Outcome for one module
enum ModuleOutcome {
    Installed,
    AlreadyInstalled,
}

/// Drives installation against a package source
pub struct Installer<'a> {
    layout: &'a Layout,
    source: &'a dyn PackageSource,
    model: &'a DependencyModel,
    options: InstallOptions,
}

impl<'a> Installer<'a> {
    pub fn new(
        layout: &'a Layout,
        source: &'a dyn PackageSource,
        model: &'a DependencyModel,
        options: InstallOptions,
    ) -> Self {
        Self {
            layout,
            source,
            model,
            options,
        }
    }

    /// Initial install set for a selection
    pub fn seeds(&self, selection: &InstallSelection) -> Vec<String> {
        match selection {
            InstallSelection::Modules(modules) => modules.clone(),
            InstallSelection::All => self.model.modules().map(str::to_string).collect(),
            InstallSelection::Installed => {
                select_modules(self.model, self.layout, ModuleState::Installed)
            }
            InstallSelection::Partial => {
                select_modules(self.model, self.layout, ModuleState::Partial)
            }
        }
    }

    /// Install the selection and, unless disabled, its dependencies
    pub fn run(&self, selection: &InstallSelection) -> Result<InstallReport> {
        if !self.options.dry_run {
            filesystem::create_dir(&self.layout.libs_dir())?;
        }

        let install_set = self
            .model
            .install_closure(self.seeds(selection), self.options.follow_dependencies);

        let mut report = InstallReport::default();
        let mut newest: Option<SystemTime> = None;

        for module in &install_set {
            if !self.model.contains(module) {
                warn!("module '{}' does not exist", module);
                report.unknown.push(module.clone());
                continue;
            }

            match self.install_module(module, &mut newest)? {
                ModuleOutcome::Installed => report.installed.push(module.clone()),
                ModuleOutcome::AlreadyInstalled => report.already_installed.push(module.clone()),
            }
        }

        let needs_build_tool = install_set.iter().any(|m| self.model.is_buildable(m));

        if self.options.follow_dependencies && needs_build_tool {
            // The build tool's marker does not count towards header freshness
            let mut ignored = None;
            report.build_tool_installed = matches!(
                self.install_module(BUILD_PACKAGE, &mut ignored)?,
                ModuleOutcome::Installed
            );
        }

        report.install_set = install_set;

        if report.is_noop() {
            info!("nothing to install, everything is already in place");
        }

        if self.options.dry_run {
            return Ok(report);
        }

        let mut needs_build: Vec<String> = report
            .installed
            .iter()
            .filter(|m| self.model.is_buildable(m))
            .cloned()
            .collect();
        needs_build.sort();

        if !needs_build.is_empty() {
            info!(
                "the following libraries need to be built:\n {}",
                needs_build.join(" ")
            );
            info!("{}", BUILD_HINT);
        }
        report.needs_build = needs_build;

        if is_stale(newest, filesystem::mtime(&self.layout.headers_marker())) {
            headers::rebuild(self.layout)?;
            report.headers_rebuilt = true;
        }

        if is_stale(newest, filesystem::mtime(&self.layout.index_file())) {
            catalog::rebuild(self.layout)?;
            report.catalog_rebuilt = true;
        }

        Ok(report)
    }

    fn install_module(&self, module: &str, newest: &mut Option<SystemTime>) -> Result<ModuleOutcome> {
        let package = module_package(module);
        let target = self.layout.package_target(package);
        let marker = self.layout.resolve(target.marker());

        let outcome = if marker.exists() {
            debug!("module '{}' is already installed", module);
            ModuleOutcome::AlreadyInstalled
        } else if self.options.dry_run {
            info!("would have installed module '{}'", module);
            ModuleOutcome::Installed
        } else {
            if package == BUILD_PACKAGE {
                filesystem::create_dir(&self.layout.tools_dir())?;
            }

            if !self.options.keep_partial {
                self.remove_partial(module, package);
            }

            info!("installing module '{}'", module);

            let extractor = Extractor::for_target(self.layout.root(), &target);

            let extracted = self
                .source
                .open_archive(package)
                .and_then(|mut archive| extractor.extract(&mut archive))
                .and_then(|_| filesystem::touch(&marker));

            if let Err(e) = extracted {
                if !self.options.keep_partial {
                    self.remove_partial(module, package);
                }
                return Err(e);
            }

            ModuleOutcome::Installed
        };

        if let Some(mtime) = filesystem::mtime(&marker) {
            *newest = Some(newest.map_or(mtime, |n| n.max(mtime)));
        }

        Ok(outcome)
    }

    /// Remove a package directory and its whitelisted files, reporting only
    fn remove_partial(&self, module: &str, package: &str) {
        let target = self.layout.package_target(package);
        let dir = self.layout.resolve(&target.dir);

        if dir.exists() {
            debug!("removing partial installation of module '{}'", module);
            // Failures are already reported through the reporter
            let _ = remove_tree(&dir, &mut LogReporter);
        }

        let _ = remove_files(
            self.layout.root(),
            target.whitelist.iter().map(String::as_str),
            &mut LogReporter,
        );
    }
}

#[cfg(windows)]
const BUILD_HINT: &str = "(use b2 to build)";
#[cfg(not(windows))]
const BUILD_HINT: &str = "(use ./b2 to build)";

/// A derived file is stale unless it is strictly newer than every marker
fn is_stale(newest_marker: Option<SystemTime>, derived: Option<SystemTime>) -> bool {
    match (newest_marker, derived) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(marker), Some(derived)) => marker >= derived,
    }
}
