// src/planner/mod.rs

//! Install and removal planning
//!
//! Both planners work on an ordered, append-only queue: the installer
//! appends unseen dependencies, the remover appends dependents when
//! cascading. Membership is checked before every append, so nothing is
//! processed twice and nothing is reordered once queued.

mod install;
mod remove;
pub mod selection;

pub use install::{InstallOptions, InstallReport, InstallSelection, Installer};
pub use remove::{RemoveOptions, RemoveReport, RemoveSelection, Remover};
pub use selection::{list_modules, module_state, select_modules, ListSelection, ModuleState};
