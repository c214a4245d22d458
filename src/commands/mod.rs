// src/commands/mod.rs
//! Command handlers for the bpm CLI

mod headers;
mod index;
mod install;
mod list;
mod remove;

pub use headers::cmd_headers;
pub use index::cmd_index;
pub use install::cmd_install;
pub use list::cmd_list;
pub use remove::cmd_remove;

use anyhow::Result;
use bpm::config::DEFAULT_CONFIG_FILE;
use bpm::{Config, DependencyModel, HttpRepository};
use std::path::Path;
use tracing::debug;

/// Load the configuration: `explicit` when given, else `bpm.conf` in the root
fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let path = explicit.map_or_else(|| root.join(DEFAULT_CONFIG_FILE), Path::to_path_buf);
    debug!("reading configuration from '{}'", path.display());
    Ok(Config::load(&path)?)
}

/// Open the configured repository and fetch its dependency manifest
fn open_repository(root: &Path, explicit: Option<&Path>) -> Result<(HttpRepository, DependencyModel)> {
    let config = load_config(root, explicit)?;
    let repository = HttpRepository::new(&config);
    let model = DependencyModel::fetch(&repository)?;
    Ok((repository, model))
}
