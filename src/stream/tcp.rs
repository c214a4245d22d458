// src/stream/tcp.rs

//! Blocking TCP transport stage

use crate::error::{Error, Result};
use std::io::{BufReader, Write};
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

use super::{fill_buffer, ByteSource};

/// Read/write timeout so that a stalled peer surfaces as a receive error
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// Raw byte stream to `host:port`
///
/// The connection is shut down when the reader is dropped, however reading ended.
pub struct TcpReader {
    name: String,
    stream: BufReader<TcpStream>,
}

impl TcpReader {
    /// Resolve `host` and connect
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let name = format!("{host}:{port}");

        if port == 0 {
            return Err(Error::transport(name, "invalid port number"));
        }

        let addrs = resolve(&name, host, port)?;
        debug!("connecting to {} ({} addresses)", name, addrs.len());

        // Each address is tried in turn
        let stream = TcpStream::connect(&addrs[..])
            .map_err(|e| Error::transport(&name, format!("TCP connect error: {e}")))?;

        stream
            .set_read_timeout(Some(TRANSPORT_TIMEOUT))
            .and_then(|()| stream.set_write_timeout(Some(TRANSPORT_TIMEOUT)))
            .map_err(|e| Error::transport(&name, format!("TCP socket option error: {e}")))?;

        Ok(Self {
            name,
            stream: BufReader::new(stream),
        })
    }

    /// Send all of `data`; only the request stage writes
    pub(crate) fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.get_mut();
        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|e| Error::transport(&self.name, format!("TCP send error: {e}")))
    }
}

impl ByteSource for TcpReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        fill_buffer(&mut self.stream, buf)
            .map_err(|e| Error::transport(&self.name, format!("TCP receive error: {e}")))
    }
}

impl Drop for TcpReader {
    fn drop(&mut self) {
        let _ = self.stream.get_ref().shutdown(Shutdown::Both);
    }
}

fn is_dotted_numeric(host: &str) -> bool {
    !host.is_empty() && host.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Candidate addresses for `host`; errors are named by `name`
fn resolve(name: &str, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    if is_dotted_numeric(host) {
        let ip: Ipv4Addr = host
            .parse()
            .map_err(|_| Error::transport(name, "invalid host address"))?;

        if ip.is_unspecified() || ip.is_broadcast() {
            return Err(Error::transport(name, "invalid host address"));
        }

        return Ok(vec![SocketAddr::new(IpAddr::V4(ip), port)]);
    }

    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map(Iterator::collect)
        .unwrap_or_default();

    if addrs.is_empty() {
        return Err(Error::transport(name, "unable to resolve host name"));
    }
    Ok(addrs)
}
