// src/stream/lzma.rs

//! Decompression stage for legacy `.lzma` streams
//!
//! The "LZMA alone" header is 13 bytes: one properties byte (lc/lp/pb),
//! a little-endian dictionary size and a little-endian uncompressed size
//! (all ones when unknown and an end marker is used instead).

use crate::error::{Error, Result};
use tracing::trace;
use xz2::stream::{Action, Status, Stream};

use super::ByteSource;

/// Size of the `.lzma` header
pub const LZMA_HEADER_SIZE: usize = 13;

/// Compressed bytes are pulled from the inner source in chunks of this size
const INPUT_BUFFER_SIZE: usize = 4096;

/// Largest valid properties byte: (pb * 5 + lp) * 9 + lc with pb, lp <= 4, lc <= 8
const MAX_PROPERTIES: u8 = 224;

/// Decompresses an inner [`ByteSource`] on the fly
pub struct LzmaReader<S> {
    inner: S,
    decoder: Stream,
    buffer: Box<[u8; INPUT_BUFFER_SIZE]>,
    /// Next undecoded byte in `buffer`
    pos: usize,
    /// Number of valid bytes in `buffer`
    len: usize,
    /// The inner source has reported end of stream
    exhausted: bool,
    /// The decoder has seen the end of the compressed stream
    finished: bool,
}

impl<S: ByteSource> LzmaReader<S> {
    /// Read and validate the header, then set up the decoder
    pub fn new(mut inner: S) -> Result<Self> {
        let mut buffer = Box::new([0u8; INPUT_BUFFER_SIZE]);

        let n = inner.read(&mut buffer[..LZMA_HEADER_SIZE])?;
        if n < LZMA_HEADER_SIZE {
            return Err(Error::decode(inner.name(), "could not read LZMA header"));
        }

        if buffer[0] > MAX_PROPERTIES {
            return Err(Error::decode(inner.name(), "invalid LZMA properties"));
        }

        let dict_size = u32::from_le_bytes([buffer[1], buffer[2], buffer[3], buffer[4]]);
        trace!("'{}': LZMA dictionary size {}", inner.name(), dict_size);

        let decoder = Stream::new_lzma_decoder(u64::MAX)
            .map_err(|e| Error::decode(inner.name(), format!("could not allocate LZMA state: {e}")))?;

        // The header stays at the front of the buffer and is fed to the decoder first
        Ok(Self {
            inner,
            decoder,
            buffer,
            pos: 0,
            len: LZMA_HEADER_SIZE,
            exhausted: false,
            finished: false,
        })
    }

    fn refill(&mut self) -> Result<()> {
        let n = self.inner.read(&mut self.buffer[..])?;
        self.pos = 0;
        self.len = n;
        if n < INPUT_BUFFER_SIZE {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl<S: ByteSource> ByteSource for LzmaReader<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut produced = 0;

        while produced < buf.len() && !self.finished {
            if self.pos == self.len && !self.exhausted {
                self.refill()?;
            }

            let in_before = self.decoder.total_in();
            let out_before = self.decoder.total_out();

            let status = self
                .decoder
                .process(&self.buffer[self.pos..self.len], &mut buf[produced..], Action::Run)
                .map_err(|e| Error::decode(self.inner.name(), format!("LZMA decoder error: {e}")))?;

            let consumed = (self.decoder.total_in() - in_before) as usize;
            let written = (self.decoder.total_out() - out_before) as usize;

            self.pos += consumed;
            produced += written;

            if status == Status::StreamEnd {
                self.finished = true;
            } else if consumed == 0 && written == 0 && self.pos == self.len && self.exhausted {
                // Input ran out before the end marker; the consumer sees a short stream
                break;
            }
        }

        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{read_to_string, IoReader};
    use std::io::Write;
    use xz2::stream::LzmaOptions;
    use xz2::write::XzEncoder;

    fn compress(data: &[u8]) -> Vec<u8> {
        let options = LzmaOptions::new_preset(6).unwrap();
        let stream = Stream::new_lzma_encoder(&options).unwrap();
        let mut encoder = XzEncoder::new_stream(Vec::new(), stream);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn pseudo_random(len: usize) -> Vec<u8> {
        let mut state = 0x2545_f491u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_decodes_small_text() {
        let compressed = compress(b"alpha -> beta gamma\n");
        let mut reader = LzmaReader::new(IoReader::new("deps.lzma", &compressed[..])).unwrap();
        assert_eq!(read_to_string(&mut reader).unwrap(), "alpha -> beta gamma\n");
    }

    #[test]
    fn test_decodes_across_many_input_refills() {
        // Incompressible data forces many 4 KiB refills
        let original = pseudo_random(50_000);
        let compressed = compress(&original);
        assert!(compressed.len() > INPUT_BUFFER_SIZE * 4);

        let mut reader = LzmaReader::new(IoReader::new("blob.lzma", &compressed[..])).unwrap();

        let mut output = Vec::new();
        let mut block = [0u8; 512];
        loop {
            let n = reader.read(&mut block).unwrap();
            output.extend_from_slice(&block[..n]);
            if n < block.len() {
                break;
            }
        }

        assert_eq!(output, original);
        assert_eq!(reader.read(&mut block).unwrap(), 0);
    }

    #[test]
    fn test_short_header_rejected() {
        let err = LzmaReader::new(IoReader::new("tiny.lzma", &[0x5du8, 0, 0][..]))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "'tiny.lzma': could not read LZMA header");
    }

    #[test]
    fn test_invalid_properties_rejected() {
        let mut header = [0u8; LZMA_HEADER_SIZE];
        header[0] = 0xff;
        let err = LzmaReader::new(IoReader::new("bad.lzma", &header[..])).err().unwrap();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_corrupt_payload_is_decode_error() {
        let mut compressed = compress(&pseudo_random(20_000));
        for byte in compressed.iter_mut().skip(LZMA_HEADER_SIZE + 16).take(64) {
            *byte = !*byte;
        }

        let mut reader = LzmaReader::new(IoReader::new("corrupt.lzma", &compressed[..])).unwrap();
        let mut sink = vec![0u8; 32_768];
        let result = (0..4).try_for_each(|_| reader.read(&mut sink).map(|_| ()));
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_truncated_stream_ends_short() {
        let original = pseudo_random(10_000);
        let compressed = compress(&original);
        let truncated = &compressed[..compressed.len() / 2];

        let mut reader = LzmaReader::new(IoReader::new("cut.lzma", truncated)).unwrap();
        let mut sink = vec![0u8; original.len()];
        let n = reader.read(&mut sink).unwrap();
        assert!(n < original.len());
    }
}
