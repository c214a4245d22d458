// src/archive/header.rs

//! Tar header block parsing
//!
//! Field decoding (octal numbers, the ustar prefix) is delegated to the
//! `tar` crate; this module adds the checks the extractor needs before it
//! trusts a block: end-of-archive detection and checksum validation.

use crate::error::{Error, Result};
use std::ops::Range;
use tar::{EntryType, Header};

/// Tar block size; headers and data are both padded to it
pub const BLOCK_SIZE: usize = 512;

/// Location of the checksum field inside a header block
const CHECKSUM_FIELD: Range<usize> = 148..156;

/// Entry types the extractor knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Directory,
    /// GNU `L` record: payload is the name of the next entry
    LongName,
    /// Anything else (links, devices, pax headers); the type byte is kept
    Other(u8),
}

/// Decoded fields of one header block
#[derive(Debug, Clone)]
pub(crate) struct EntryHeader {
    pub name: Vec<u8>,
    pub kind: EntryKind,
    pub size: u64,
    pub mode: u32,
    pub mtime: u64,
}

/// Result of inspecting a header block
#[derive(Debug)]
pub(crate) enum Block {
    /// All-zero block marking the end of the archive
    End,
    Entry(EntryHeader),
}

/// Unsigned byte sum of a header with the checksum field read as spaces
pub(crate) fn header_checksum(block: &[u8; BLOCK_SIZE]) -> u32 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if CHECKSUM_FIELD.contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(b)
            }
        })
        .sum()
}

/// Inspect one header block read from `source`
pub(crate) fn parse_block(block: &[u8; BLOCK_SIZE], source: &str) -> Result<Block> {
    if block[0] == 0 {
        if block.iter().fold(0u8, |acc, &b| acc | b) != 0 {
            return Err(Error::archive(source, "bad block"));
        }
        return Ok(Block::End);
    }

    let header = Header::from_byte_slice(&block[..]);

    // An unparsable checksum field is a mismatch like any other
    let stored = header.cksum().ok();
    if stored != Some(header_checksum(block)) {
        return Err(Error::archive(source, "header checksum mismatch"));
    }

    let kind = match header.entry_type() {
        EntryType::Regular => EntryKind::File,
        EntryType::Directory => EntryKind::Directory,
        EntryType::GNULongName => EntryKind::LongName,
        other => EntryKind::Other(other.as_byte()),
    };

    let field = |name: &str| Error::archive(source, format!("invalid {name} field"));

    let size = header.size().map_err(|_| field("size"))?;
    let mode = header.mode().map_err(|_| field("mode"))?;
    let mtime = header.mtime().map_err(|_| field("mtime"))?;

    Ok(Block::Entry(EntryHeader {
        name: header.path_bytes().into_owned(),
        kind,
        size,
        mode,
        mtime,
    }))
}
