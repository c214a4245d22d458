// src/stream/http.rs

//! Minimal HTTP/1.0 request stage
//!
//! Sends one GET with `Connection: close`, validates the status line and
//! skips the response headers. Everything after the blank separator line is
//! passed through unfiltered; chunked transfer encoding is not supported.

use crate::error::{Error, Result};
use tracing::debug;
use url::Url;

use super::{ByteSource, TcpReader};

/// Components of an `http://` URL needed to issue a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl {
    pub host: String,
    pub port: u16,
    /// Path plus query, always starting with `/`
    pub target: String,
}

impl HttpUrl {
    /// Parse an `http://host[:port][/path]` URL
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|_| Error::protocol(url, "not an HTTP URL"))?;

        if parsed.scheme() != "http" {
            return Err(Error::protocol(url, "not an HTTP URL"));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| Error::protocol(url, "URL has no host"))?
            .to_string();

        let port = parsed.port_or_known_default().unwrap_or(80);

        let mut target = parsed.path().to_string();
        if target.is_empty() {
            target.push('/');
        }
        if let Some(query) = parsed.query() {
            target.push('?');
            target.push_str(query);
        }

        Ok(Self { host, port, target })
    }

    fn request(&self) -> String {
        format!(
            "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.target, self.host
        )
    }
}

/// Response body of a single GET request
pub struct HttpReader {
    name: String,
    transport: TcpReader,
}

impl HttpReader {
    /// Connect, send the request and position the stream at the body
    pub fn open(url: &str) -> Result<Self> {
        let parts = HttpUrl::parse(url)?;

        debug!("requesting '{}'", url);

        let mut transport = TcpReader::connect(&parts.host, parts.port)?;
        transport.write_all(parts.request().as_bytes())?;

        let mut reader = Self {
            name: url.to_string(),
            transport,
        };

        let status = reader.read_line()?;
        reader.check_status(&status)?;

        // Skip the rest of the header
        while !reader.read_line()?.is_empty() {}

        Ok(reader)
    }

    fn check_status(&self, line: &str) -> Result<()> {
        let mut tokens = line.split_whitespace();

        let protocol = tokens.next().unwrap_or_default();
        let code = tokens.next().and_then(|c| c.parse::<u16>().ok());

        match code {
            Some(code) if protocol.starts_with("HTTP/1.") && code >= 100 => {
                if code >= 300 {
                    Err(Error::protocol(&self.name, format!("HTTP error: {line}")))
                } else {
                    Ok(())
                }
            }
            _ => Err(Error::protocol(
                &self.name,
                format!("invalid server response: '{line}'"),
            )),
        }
    }

    /// Read one header line, dropping `\r` and the terminating `\n`
    fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let mut byte = [0u8; 1];

            if self.transport.read(&mut byte)? != 1 {
                return Err(Error::protocol(&self.name, "unexpected end of data"));
            }

            match byte[0] {
                b'\n' => break,
                b'\r' => {}
                b => line.push(b),
            }
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

impl ByteSource for HttpReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.transport.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned response and hand back the request that was received
    fn serve_once(response: &'static [u8]) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();

            let mut request = Vec::new();
            let mut byte = [0u8; 1];
            while !request.ends_with(b"\r\n\r\n") {
                socket.read_exact(&mut byte).unwrap();
                request.push(byte[0]);
            }

            socket.write_all(response).unwrap();
            String::from_utf8(request).unwrap()
        });

        (port, handle)
    }

    #[test]
    fn test_parse_url_with_port_and_path() {
        let url = HttpUrl::parse("http://example.org:8080/pkgs/foo.tar.lzma").unwrap();
        assert_eq!(url.host, "example.org");
        assert_eq!(url.port, 8080);
        assert_eq!(url.target, "/pkgs/foo.tar.lzma");
    }

    #[test]
    fn test_parse_url_defaults() {
        let url = HttpUrl::parse("http://example.org").unwrap();
        assert_eq!(url.port, 80);
        assert_eq!(url.target, "/");
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(HttpUrl::parse("https://example.org/").is_err());
        assert!(HttpUrl::parse("ftp://example.org/").is_err());
        assert!(HttpUrl::parse("example.org/foo").is_err());
    }

    #[test]
    fn test_body_follows_headers() {
        let (port, server) = serve_once(
            b"HTTP/1.0 200 OK\r\nContent-Type: application/octet-stream\r\n\r\npayload bytes",
        );

        let url = format!("http://127.0.0.1:{port}/repo/dependencies.txt.lzma");
        let mut reader = HttpReader::open(&url).unwrap();
        assert_eq!(reader.name(), url);

        let mut buf = [0u8; 64];
        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"payload bytes");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /repo/dependencies.txt.lzma HTTP/1.0\r\n"));
        assert!(request.contains("Host: 127.0.0.1\r\n"));
        assert!(request.contains("Connection: close\r\n"));
    }

    #[test]
    fn test_not_found_is_protocol_error() {
        let (port, server) = serve_once(b"HTTP/1.1 404 Not Found\r\n\r\nmissing");

        let url = format!("http://127.0.0.1:{port}/nope.tar.lzma");
        let err = HttpReader::open(&url).err().unwrap();
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(err.to_string().contains("HTTP error: HTTP/1.1 404 Not Found"));

        server.join().unwrap();
    }

    #[test]
    fn test_garbage_status_line_rejected() {
        let (port, server) = serve_once(b"SSH-2.0-OpenSSH\r\n\r\n");

        let url = format!("http://127.0.0.1:{port}/");
        let err = HttpReader::open(&url).err().unwrap();
        assert!(err.to_string().contains("invalid server response"));

        server.join().unwrap();
    }

    #[test]
    fn test_truncated_header_rejected() {
        let (port, server) = serve_once(b"HTTP/1.0 200 OK\r\nServer: x");

        let url = format!("http://127.0.0.1:{port}/");
        let err = HttpReader::open(&url).err().unwrap();
        assert!(err.to_string().contains("unexpected end of data"));

        server.join().unwrap();
    }
}
