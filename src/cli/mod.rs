// src/cli/mod.rs
//! CLI definitions for bpm
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Commands:
//! - `install` - Install modules and their dependencies
//! - `remove` - Remove packages, refusing while dependents are installed
//! - `list` - List modules known to the repository
//! - `headers` - Recreate the unified include tree
//! - `index` - Recreate `index.html`

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bpm")]
#[command(version)]
#[command(about = "Installer for modular source-library collections", long_about = None)]
pub struct Cli {
    /// More output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Working root
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Configuration file (default: bpm.conf in the working root)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Verbosity relative to the default level
    pub fn verbosity(&self) -> i32 {
        i32::from(self.verbose) - i32::from(self.quiet)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install modules and their dependencies
    Install {
        /// Only report what would be installed
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Do not install dependencies
        #[arg(long)]
        no_deps: bool,

        /// Do not remove partial installations on error
        #[arg(short, long)]
        keep: bool,

        /// All modules
        #[arg(short, long, conflicts_with_all = ["installed", "partial", "modules"])]
        all: bool,

        /// Modules that are already installed
        #[arg(short, long, conflicts_with_all = ["partial", "modules"])]
        installed: bool,

        /// Modules that are partially installed
        #[arg(short, long, conflicts_with = "modules")]
        partial: bool,

        /// Modules to install
        modules: Vec<String>,
    },

    /// Remove packages
    Remove {
        /// Only report what would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Remove even when installed packages depend on these
        #[arg(short, long)]
        force: bool,

        /// Remove dependents as well; requires -f unless -n
        #[arg(short, long)]
        dependents: bool,

        /// All packages; requires -f unless -n
        #[arg(short, long, conflicts_with_all = ["partial", "packages"])]
        all: bool,

        /// Partially installed packages
        #[arg(short, long, conflicts_with = "packages")]
        partial: bool,

        /// Packages to remove
        packages: Vec<String>,
    },

    /// List modules
    List {
        /// All modules (default without -b)
        #[arg(short, long, conflicts_with_all = ["installed", "partial"])]
        all: bool,

        /// Installed modules (default with -b)
        #[arg(short, long, conflicts_with = "partial")]
        installed: bool,

        /// Partially installed modules
        #[arg(short, long, conflicts_with = "buildable")]
        partial: bool,

        /// Modules that require building
        #[arg(short, long)]
        buildable: bool,

        /// Only modules whose name starts with this
        prefix: Option<String>,
    },

    /// Recreate the unified include tree
    Headers,

    /// Recreate index.html
    Index,
}
