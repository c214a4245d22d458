// src/stream/mod.rs

//! Layered streaming readers
//!
//! Archives and manifests are never buffered whole. They flow through a chain
//! of byte sources, each owning the stage beneath it:
//!
//! - [`TcpReader`] - raw byte stream to `host:port`
//! - [`HttpReader`] - issues a GET, validates the status, skips headers
//! - [`LzmaReader`] - decodes a legacy `.lzma` stream in bounded chunks
//!
//! Dropping the outermost stage releases the whole chain, including the
//! socket, on every exit path.

mod http;
mod lzma;
mod tcp;

pub use http::{HttpReader, HttpUrl};
pub use lzma::LzmaReader;
pub use tcp::TcpReader;

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// A named, blocking source of bytes
///
/// `read` returns fewer bytes than requested only at end of stream. Stages
/// loop over short reads of whatever they wrap, so callers can treat a
/// short return as EOF. Failures carry the name of the resource.
pub trait ByteSource {
    /// URL, `host:port` or path this source reads from
    fn name(&self) -> &str;

    /// Fill `buf` as far as the stream allows
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}

/// Read from `reader` until `buf` is full or the reader reports EOF
pub(crate) fn fill_buffer<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Drain a source into a string
///
/// Manifests are small text files; invalid UTF-8 is a decode error.
pub fn read_to_string<S: ByteSource + ?Sized>(source: &mut S) -> Result<String> {
    const CHUNK: usize = 4096;

    let mut data = Vec::new();
    let mut buffer = [0u8; CHUNK];

    loop {
        let n = source.read(&mut buffer)?;
        data.extend_from_slice(&buffer[..n]);
        if n < CHUNK {
            break;
        }
    }

    String::from_utf8(data).map_err(|_| Error::decode(source.name(), "data is not valid UTF-8"))
}

/// Adapts any `std::io::Read` (a local file, an in-memory buffer) to a [`ByteSource`]
pub struct IoReader<R> {
    name: String,
    inner: R,
}

impl<R: Read> IoReader<R> {
    /// Wrap a reader under the given name
    pub fn new(name: impl Into<String>, inner: R) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

impl IoReader<File> {
    /// Open a local file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::filesystem(path, "open error", e))?;
        Ok(Self::new(path.display().to_string(), file))
    }
}

impl<R: Read> ByteSource for IoReader<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        fill_buffer(&mut self.inner, buf).map_err(|e| Error::filesystem(&self.name, "read error", e))
    }
}
