// src/repository/mod.rs

//! Package repository access and dependency metadata
//!
//! This module provides:
//! - The [`PackageSource`] seam and its HTTP implementation
//! - The [`DependencyModel`] built from the repository manifests

mod client;
mod manifest;

pub use client::{HttpRepository, PackageSource, ARCHIVE_SUFFIX};
pub use manifest::{DependencyModel, BUILDABLE_FILE, DEPENDENCIES_FILE};
