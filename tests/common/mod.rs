// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use bpm::repository::{BUILDABLE_FILE, DEPENDENCIES_FILE};
use bpm::stream::IoReader;
use bpm::{ByteSource, DependencyModel, Error, Layout, PackageSource, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;
use xz2::stream::{LzmaOptions, Stream};
use xz2::write::XzEncoder;

/// Modification time stamped on every test archive entry
pub const ENTRY_MTIME: u64 = 1_400_000_000;

/// A repository held in memory that records every archive it hands out
pub struct MemoryRepository {
    dependencies: String,
    buildable: String,
    archives: HashMap<String, Vec<u8>>,
    fetches: RefCell<Vec<String>>,
}

impl MemoryRepository {
    pub fn new(dependencies: &str, buildable: &str) -> Self {
        Self {
            dependencies: dependencies.to_string(),
            buildable: buildable.to_string(),
            archives: HashMap::new(),
            fetches: RefCell::new(Vec::new()),
        }
    }

    /// Register the (uncompressed) tar archive of a package
    pub fn with_archive(mut self, package: &str, tar: Vec<u8>) -> Self {
        self.archives.insert(package.to_string(), tar);
        self
    }

    /// Register a package whose archive holds a directory and one header
    pub fn with_package(self, package: &str) -> Self {
        let prefix = format!("libs/{package}");
        let header = format!("{prefix}/include/boost/{package}.hpp");
        let tar = tar_archive(&[(&format!("{prefix}/"), b""), (&header, package.as_bytes())]);
        self.with_archive(package, tar)
    }

    /// Packages fetched so far, in order
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }

    pub fn model(&self) -> DependencyModel {
        DependencyModel::fetch(self).unwrap()
    }
}

impl PackageSource for MemoryRepository {
    fn url(&self, file: &str) -> String {
        format!("memory:///{file}")
    }

    fn open_archive(&self, package: &str) -> Result<Box<dyn ByteSource>> {
        self.fetches.borrow_mut().push(package.to_string());

        let url = self.url(&format!("{package}.tar.lzma"));
        match self.archives.get(package) {
            Some(tar) => Ok(Box::new(IoReader::new(url, Cursor::new(tar.clone())))),
            None => Err(Error::Protocol {
                name: url,
                reason: "HTTP error: HTTP/1.0 404 Not Found".to_string(),
            }),
        }
    }

    fn fetch_text(&self, file: &str) -> Result<String> {
        match file {
            DEPENDENCIES_FILE => Ok(self.dependencies.clone()),
            BUILDABLE_FILE => Ok(self.buildable.clone()),
            _ => Err(Error::Protocol {
                name: self.url(file),
                reason: "HTTP error: HTTP/1.0 404 Not Found".to_string(),
            }),
        }
    }
}

/// Build a tar archive; names ending in `/` become directories
pub fn tar_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());

    for (name, data) in entries {
        let mut header = Header::new_gnu();
        header.set_path(name).unwrap();
        if name.ends_with('/') {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
        } else {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(0o644);
        }
        header.set_size(data.len() as u64);
        header.set_mtime(ENTRY_MTIME);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }

    builder.into_inner().unwrap()
}

/// Compress with the legacy `.lzma` format
pub fn lzma_compress(data: &[u8]) -> Vec<u8> {
    let options = LzmaOptions::new_preset(6).unwrap();
    let stream = Stream::new_lzma_encoder(&options).unwrap();
    let mut encoder = XzEncoder::new_stream(Vec::new(), stream);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Scratch working root
///
/// Returns (TempDir, Layout) - keep the TempDir alive to prevent cleanup.
pub fn setup_root() -> (TempDir, Layout) {
    let temp_dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(temp_dir.path());
    (temp_dir, layout)
}

/// Mark a package installed without going through the installer
pub fn fake_install(layout: &Layout, package: &str) {
    std::fs::create_dir_all(layout.package_dir(package)).unwrap();
    std::fs::write(layout.package_marker(package), b"").unwrap();
}

pub fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Serve canned HTTP/1.0 responses, keyed by request path, on a loopback port
///
/// Returns the base URL (`http://127.0.0.1:<port>/`). Unknown paths get a 404.
pub fn serve(routes: HashMap<String, Vec<u8>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };

            let mut request = Vec::new();
            let mut byte = [0u8; 1];
            while !request.ends_with(b"\r\n\r\n") {
                match stream.read(&mut byte) {
                    Ok(1) => request.push(byte[0]),
                    _ => break,
                }
            }

            let request = String::from_utf8_lossy(&request);
            let path = request.split_whitespace().nth(1).unwrap_or("/");

            let _ = match routes.get(path) {
                Some(body) => stream
                    .write_all(b"HTTP/1.0 200 OK\r\nContent-Type: application/octet-stream\r\n\r\n")
                    .and_then(|_| stream.write_all(body)),
                None => stream.write_all(b"HTTP/1.0 404 Not Found\r\n\r\n"),
            };
        }
    });

    format!("http://127.0.0.1:{port}/")
}
