// src/lib.rs

//! bpm: module installer for a modular source-library collection
//!
//! Installs modules from a remote package repository into a working root,
//! following their dependencies, and removes them again only when nothing
//! installed still depends on them.
//!
//! # Architecture
//!
//! - Streams: packages arrive as `.tar.lzma` over plain HTTP/1.0, read
//!   through a stack of byte sources (TCP, HTTP, LZMA)
//! - Archives: tar entries are checked against a name policy before
//!   anything is written
//! - Markers: a package counts as installed only once its `.installed`
//!   marker exists; a directory without one is a partial install
//! - Headers: every installed package's headers are exposed through one
//!   unified `include/` tree made of links
//! - Catalog: package metadata is rendered into `index.html`

pub mod archive;
pub mod catalog;
pub mod config;
mod error;
pub mod filesystem;
pub mod headers;
pub mod layout;
pub mod planner;
pub mod repository;
pub mod stream;

pub use config::Config;
pub use error::{Error, Result};
pub use layout::Layout;
pub use planner::{
    InstallOptions, InstallReport, InstallSelection, Installer, ListSelection, RemoveOptions,
    RemoveReport, RemoveSelection, Remover,
};
pub use repository::{DependencyModel, HttpRepository, PackageSource};
pub use stream::ByteSource;
