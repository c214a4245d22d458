// src/repository/client.rs

//! Access to the remote package repository
//!
//! Every fetch opens a fresh connection: HTTP request, then LZMA decoding.
//! Archives are handed back as a stream for the extractor; manifests are
//! small and are read whole.

use crate::config::Config;
use crate::error::Result;
use crate::stream::{read_to_string, ByteSource, HttpReader, LzmaReader};
use tracing::debug;

/// Suffix of package archives in the repository
pub const ARCHIVE_SUFFIX: &str = ".tar.lzma";

/// Where packages and manifests come from
///
/// The planners only see this trait, so tests can substitute an in-memory
/// repository.
pub trait PackageSource {
    /// Full location of a repository file, used to name errors
    fn url(&self, file: &str) -> String;

    /// Open the decompressed tar stream of `package`
    fn open_archive(&self, package: &str) -> Result<Box<dyn ByteSource>>;

    /// Fetch and decompress a text file from the repository root
    fn fetch_text(&self, file: &str) -> Result<String>;
}

/// Repository served over plain HTTP
#[derive(Debug, Clone)]
pub struct HttpRepository {
    /// Base URL, `http://...` ending in `/`
    base: String,
}

impl HttpRepository {
    pub fn new(config: &Config) -> Self {
        Self {
            base: config.package_path().to_string(),
        }
    }

    fn open(&self, file: &str) -> Result<LzmaReader<HttpReader>> {
        let url = self.url(file);
        debug!("fetching '{}'", url);
        LzmaReader::new(HttpReader::open(&url)?)
    }
}

impl PackageSource for HttpRepository {
    fn url(&self, file: &str) -> String {
        format!("{}{}", self.base, file)
    }

    fn open_archive(&self, package: &str) -> Result<Box<dyn ByteSource>> {
        let reader = self.open(&format!("{package}{ARCHIVE_SUFFIX}"))?;
        Ok(Box::new(reader))
    }

    fn fetch_text(&self, file: &str) -> Result<String> {
        read_to_string(&mut self.open(file)?)
    }
}
