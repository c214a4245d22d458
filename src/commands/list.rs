// src/commands/list.rs
//! Module listing command

use super::open_repository;
use anyhow::Result;
use bpm::planner::list_modules;
use bpm::{Layout, ListSelection};
use std::path::Path;

/// Print matching modules to stdout, one per line
pub fn cmd_list(
    layout: &Layout,
    config: Option<&Path>,
    selection: ListSelection,
    buildable: bool,
    prefix: &str,
) -> Result<()> {
    let (_, model) = open_repository(layout.root(), config)?;

    for module in list_modules(&model, layout, selection, buildable, prefix) {
        println!("{}", module);
    }

    Ok(())
}
