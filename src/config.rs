// src/config.rs

//! Repository configuration
//!
//! A plain `key=value` file, loaded once at startup and passed down as an
//! immutable value. Only `package_path` is required.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Default configuration file name, looked up in the working root
pub const DEFAULT_CONFIG_FILE: &str = "bpm.conf";

/// Parsed configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the package repository; `http://...` ending in `/`
    package_path: String,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading configuration from {}", path.display());

        let text =
            fs::read_to_string(path).map_err(|e| Error::filesystem(path, "read error", e))?;

        Self::parse(&text, &path.display().to_string())
    }

    /// Parse configuration text; `origin` names the source in error messages
    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let mut values = parse_pairs(text);

        let package_path = values
            .remove("package_path")
            .ok_or_else(|| Error::Config(format!("package_path not set in {origin}")))?;

        if !package_path.starts_with("http://") || !package_path.ends_with('/') {
            return Err(Error::Config(format!(
                "invalid package_path '{package_path}' in {origin}"
            )));
        }

        Ok(Self { package_path })
    }

    /// Build a configuration directly from a repository URL
    pub fn with_package_path(package_path: impl Into<String>) -> Result<Self> {
        let package_path = package_path.into();
        Self::parse(&format!("package_path={package_path}\n"), "arguments")
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }
}

fn parse_pairs(text: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        // Comments and blank lines start with anything but a letter
        if !line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        trace!("config: {}={}", key, value);
        values.insert(key.to_string(), value.to_string());
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic() {
        let config = Config::parse(
            "# repository\npackage_path=http://example.org/pkgs/\r\nmirror=none\n",
            "bpm.conf",
        )
        .unwrap();

        assert_eq!(config.package_path(), "http://example.org/pkgs/");
    }

    #[test]
    fn test_later_keys_override() {
        let config = Config::parse(
            "package_path=http://a.example/\npackage_path=http://b.example/\n",
            "bpm.conf",
        )
        .unwrap();
        assert_eq!(config.package_path(), "http://b.example/");
    }

    #[test]
    fn test_ignores_malformed_lines() {
        let values = parse_pairs("=orphan\n  indented=1\nnoequals\n1digit=x\nmirror=a=b\r\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("mirror").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_only_package_path_is_kept() {
        let plain = Config::with_package_path("http://h/").unwrap();
        let noisy = Config::parse("mirror=x\npackage_path=http://h/\ncolor=1\n", "bpm.conf").unwrap();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_missing_package_path() {
        let err = Config::parse("mirror=x\n", "bpm.conf").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_package_path() {
        for bad in ["https://example.org/", "http://example.org", "ftp://x/"] {
            let err = Config::with_package_path(bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid package_path '{bad}' in arguments")
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "package_path=http://127.0.0.1:8080/").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.package_path(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_load_missing_file_is_filesystem_error() {
        let err = Config::load("/nonexistent/bpm.conf").unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }
}
