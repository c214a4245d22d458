// src/error.rs

//! Error types for bpm
//!
//! Every variant names the resource it concerns (a URL, `host:port`, path or
//! package) so that a failure can be reported as a single line.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors produced by the installation and removal engine
#[derive(Error, Debug)]
pub enum Error {
    /// Connect, DNS, send or receive failure; `name` is `host:port`
    #[error("'{name}': {reason}")]
    Transport { name: String, reason: String },

    /// Malformed or unsuccessful HTTP response; `name` is the URL
    #[error("'{name}': {reason}")]
    Protocol { name: String, reason: String },

    /// Malformed compressed header or decoder failure
    #[error("'{name}': {reason}")]
    Decode { name: String, reason: String },

    /// Checksum mismatch, truncated block, disallowed entry name or type
    #[error("'{name}': {reason}")]
    Archive { name: String, reason: String },

    /// Create, write, remove or link failure on a local path
    #[error("'{path}': {reason}: {source}")]
    Filesystem {
        path: String,
        reason: &'static str,
        #[source]
        source: io::Error,
    },

    /// Malformed dependency manifest
    #[error("'{name}': {reason}")]
    Manifest { name: String, reason: String },

    /// Invalid or missing configuration
    #[error("{0}")]
    Config(String),

    /// Invalid combination of options
    #[error("{0}")]
    Usage(String),

    /// A package cannot be removed while installed packages depend on it
    #[error("package '{package}' cannot be removed due to dependents: {}", dependents.join(" "))]
    BlockedByDependents {
        package: String,
        dependents: Vec<String>,
    },
}

impl Error {
    pub(crate) fn transport(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn protocol(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Protocol {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn archive(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Archive {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn filesystem(path: impl AsRef<Path>, reason: &'static str, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().display().to_string(),
            reason,
            source,
        }
    }

    pub(crate) fn manifest(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Manifest {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for bpm operations
pub type Result<T> = std::result::Result<T, Error>;
