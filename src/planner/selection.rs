// src/planner/selection.rs

//! Module selection by installation state
//!
//! Shared by `install -i/-p` and `list`.

use crate::layout::{module_package, Layout};
use crate::repository::DependencyModel;

/// On-disk state of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Module directory present and its package marker written
    Installed,
    /// Module directory present without a package marker
    Partial,
}

/// Which modules a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListSelection {
    #[default]
    All,
    Installed,
    Partial,
}

/// State of `module`, or `None` when its directory does not exist
pub fn module_state(layout: &Layout, module: &str) -> Option<ModuleState> {
    if !layout.module_dir(module).exists() {
        return None;
    }

    if layout.is_package_installed(module_package(module)) {
        Some(ModuleState::Installed)
    } else {
        Some(ModuleState::Partial)
    }
}

/// Known modules in the given state, in manifest order
pub fn select_modules(model: &DependencyModel, layout: &Layout, state: ModuleState) -> Vec<String> {
    model
        .modules()
        .filter(|module| module_state(layout, module) == Some(state))
        .map(str::to_string)
        .collect()
}

/// Modules for `list`: filtered by selection, name prefix and buildable flag
pub fn list_modules(
    model: &DependencyModel,
    layout: &Layout,
    selection: ListSelection,
    buildable_only: bool,
    prefix: &str,
) -> Vec<String> {
    model
        .modules()
        .filter(|module| module.starts_with(prefix))
        .filter(|module| match selection {
            ListSelection::All => true,
            ListSelection::Installed => module_state(layout, module) == Some(ModuleState::Installed),
            ListSelection::Partial => module_state(layout, module) == Some(ModuleState::Partial),
        })
        .filter(|module| !buildable_only || model.is_buildable(module))
        .map(str::to_string)
        .collect()
}
