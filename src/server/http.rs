//! Minimal HTTP request parsing for the pre-upgrade exchange, and the
//! pluggable responder used for requests that never upgrade.

use crate::Result;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// A parsed HTTP request line plus headers, as read off the transport
/// before the connection is classified as WebSocket or plain HTTP.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub version: String,
    headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Reads the request line and all header lines up to the blank-line
    /// terminator. `Ok(None)` if the peer closed before sending anything.
    pub(crate) async fn read<R>(reader: &mut R) -> Result<Option<Self>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let mut request = Self::from_request_line(&line)?;

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                return Err(malformed("request ended before the header terminator"));
            }
            if !line.ends_with("\r\n") {
                return Err(malformed("header line without CRLF"));
            }
            if line == "\r\n" {
                break;
            }
            request.push_header_line(line.trim_end_matches("\r\n"))?;
        }

        Ok(Some(request))
    }

    fn from_request_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(path), Some(version), None) => Ok(Self {
                method: method.to_string(),
                path: path.to_string(),
                version: version.to_string(),
                headers: Vec::new(),
            }),
            _ => Err(malformed("malformed request line")),
        }
    }

    fn push_header_line(&mut self, line: &str) -> Result<()> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| malformed("header line without a colon"))?;
        self.headers
            .push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        Ok(())
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

fn malformed(what: &str) -> crate::Error {
    io::Error::new(io::ErrorKind::InvalidData, what.to_string()).into()
}

/// Handles requests that carry no `Upgrade` header. The responder sees the
/// parsed method/path/headers and returns the complete raw response; the
/// connection is closed after it is written. No WebSocket framing is ever
/// attempted on such a connection.
pub trait HttpResponder {
    fn respond(&self, request: &HttpRequest) -> Vec<u8>;
}

/// Default responder: answers every plain-HTTP request with a 404.
pub struct NotFound;

impl HttpResponder for NotFound {
    fn respond(&self, _request: &HttpRequest) -> Vec<u8> {
        let body = b"file not found";
        let mut response = format!(
            "HTTP/1.1 404 NOT FOUND\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }
}
