// src/archive/mod.rs

//! Streaming tar extraction
//!
//! Archives are consumed block by block from a [`ByteSource`] and written
//! straight to disk; nothing is buffered beyond one 512-byte block. Every
//! entry is checked against the extraction policy before anything is
//! created for it:
//!
//! 1. the type must be a regular file or a directory (GNU long-name records
//!    only rename the entry that follows them)
//! 2. the name must lie under the extraction prefix or be whitelisted
//! 3. no name segment may be `..`
//!
//! A violation aborts extraction. Cleaning up whatever was written before
//! the violation is the caller's job.

mod header;

pub use header::BLOCK_SIZE;

use crate::error::{Error, Result};
use crate::filesystem::path::check_entry_name;
use crate::layout::PackageTarget;
use crate::stream::ByteSource;
use filetime::FileTime;
use header::{parse_block, Block, EntryHeader, EntryKind};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Upper bound on a GNU long name payload
const MAX_LONG_NAME: u64 = 64 * 1024;

/// Counts reported after a successful extraction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    /// Payload bytes written to files
    pub bytes: u64,
}

/// Extracts archives below a working root
#[derive(Debug, Clone)]
pub struct Extractor {
    root: PathBuf,
    prefix: String,
    whitelist: Vec<String>,
}

impl Extractor {
    /// Extract into `root`, accepting names under `prefix` (e.g. `libs/foo/`)
    /// and the exact paths in `whitelist`
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>, whitelist: Vec<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            whitelist,
        }
    }

    /// Extractor for a package's installation target
    pub fn for_target(root: impl Into<PathBuf>, target: &PackageTarget) -> Self {
        Self::new(root, target.prefix(), target.whitelist.clone())
    }

    /// Extract every entry of the archive read from `source`
    pub fn extract<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<ExtractSummary> {
        debug!("extracting from '{}'", source.name());

        let mut summary = ExtractSummary::default();
        let mut block = [0u8; BLOCK_SIZE];

        loop {
            if !read_header_block(source, &mut block)? {
                break;
            }

            let mut entry = match parse_block(&block, source.name())? {
                Block::End => break,
                Block::Entry(entry) => entry,
            };

            if entry.kind == EntryKind::LongName {
                let long_name = read_long_name(source, entry.size)?;

                // The long name applies to the next header, which must exist
                if !read_header_block(source, &mut block)? {
                    return Err(unexpected_eof(source.name()));
                }
                entry = match parse_block(&block, source.name())? {
                    Block::End => return Err(unexpected_eof(source.name())),
                    Block::Entry(next) => next,
                };
                entry.name = long_name;
            }

            self.extract_entry(source, entry, &mut summary)?;
        }

        debug!(
            "extracted {} files and {} directories ({} bytes) from '{}'",
            summary.files,
            summary.directories,
            summary.bytes,
            source.name()
        );

        Ok(summary)
    }

    fn extract_entry<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        entry: EntryHeader,
        summary: &mut ExtractSummary,
    ) -> Result<()> {
        let is_dir = match entry.kind {
            EntryKind::File => false,
            EntryKind::Directory => true,
            EntryKind::LongName | EntryKind::Other(_) => {
                return Err(Error::archive(source.name(), "disallowed file type"));
            }
        };

        let mut name = String::from_utf8(entry.name)
            .map_err(|_| Error::archive(source.name(), "file name is not valid UTF-8"))?;

        if is_dir && !name.ends_with('/') {
            name.push('/');
        }

        if let Err(violation) = check_entry_name(&name, &self.prefix, &self.whitelist) {
            debug!("rejecting '{}': {:?}", name, violation);
            return Err(Error::archive(
                source.name(),
                format!("disallowed file name: '{name}'"),
            ));
        }

        trace!("extracting '{}'", name);

        let path = self.root.join(&name);
        let mtime = FileTime::from_unix_time(i64::try_from(entry.mtime).unwrap_or(i64::MAX), 0);

        if is_dir {
            if entry.size != 0 {
                return Err(Error::archive(
                    source.name(),
                    format!("directory with nonzero size: '{name}'"),
                ));
            }

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, "create error", e))?;
            }
            crate::filesystem::create_dir(&path)?;

            if name != self.prefix {
                set_mtime(&path, mtime)?;
            }

            summary.directories += 1;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, "create error", e))?;
            }

            let mut file = create_file(&path, entry.mode)?;
            copy_data(source, &mut file, &path, entry.size)?;
            drop(file);

            set_mtime(&path, mtime)?;

            summary.files += 1;
            summary.bytes += entry.size;
        }

        Ok(())
    }
}

/// Read one header block; `false` on a clean end of stream
fn read_header_block<S: ByteSource + ?Sized>(source: &mut S, block: &mut [u8; BLOCK_SIZE]) -> Result<bool> {
    match source.read(block)? {
        0 => Ok(false),
        BLOCK_SIZE => Ok(true),
        _ => Err(unexpected_eof(source.name())),
    }
}

/// Read a full data block; archives are always block padded
fn read_data_block<S: ByteSource + ?Sized>(source: &mut S, block: &mut [u8; BLOCK_SIZE]) -> Result<()> {
    if source.read(block)? < BLOCK_SIZE {
        return Err(unexpected_eof(source.name()));
    }
    Ok(())
}

fn read_long_name<S: ByteSource + ?Sized>(source: &mut S, size: u64) -> Result<Vec<u8>> {
    if size > MAX_LONG_NAME {
        return Err(Error::archive(source.name(), "long file name is too long"));
    }

    let mut name = Vec::with_capacity(size as usize);
    let mut block = [0u8; BLOCK_SIZE];
    let mut remaining = size as usize;

    while remaining > 0 {
        read_data_block(source, &mut block)?;
        let n = remaining.min(BLOCK_SIZE);
        name.extend_from_slice(&block[..n]);
        remaining -= n;
    }

    while name.last() == Some(&0) {
        name.pop();
    }

    Ok(name)
}

fn copy_data<S: ByteSource + ?Sized>(source: &mut S, file: &mut File, path: &Path, size: u64) -> Result<()> {
    let mut block = [0u8; BLOCK_SIZE];
    let mut remaining = size;

    while remaining > 0 {
        read_data_block(source, &mut block)?;
        let n = remaining.min(BLOCK_SIZE as u64) as usize;
        file.write_all(&block[..n])
            .map_err(|e| Error::filesystem(path, "write error", e))?;
        remaining -= n as u64;
    }

    Ok(())
}

fn create_file(path: &Path, mode: u32) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(if mode & 0o111 != 0 { 0o755 } else { 0o644 });
    }
    #[cfg(not(unix))]
    let _ = mode;

    options
        .open(path)
        .map_err(|e| Error::filesystem(path, "create error", e))
}

fn set_mtime(path: &Path, mtime: FileTime) -> Result<()> {
    filetime::set_file_times(path, FileTime::now(), mtime)
        .map_err(|e| Error::filesystem(path, "set time error", e))
}

fn unexpected_eof(name: &str) -> Error {
    Error::archive(name, "unexpected end of file")
}
