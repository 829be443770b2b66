//! Opening handshake (RFC 6455 section 4): the one-time HTTP Upgrade
//! exchange that moves a connection from plain HTTP to WebSocket framing.

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha1::{Digest, Sha1};

const GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Generates a fresh `Sec-WebSocket-Key`: 16 random bytes, base64 encoded.
pub fn generate_key() -> String {
    let nonce: [u8; 16] = rand::random();
    BASE64.encode(nonce)
}

/// Computes the `Sec-WebSocket-Accept` token for a client key:
/// `base64(SHA1(key ++ GUID))`.
pub fn accept_key(key: &str) -> String {
    let mut sha1 = Sha1::new();
    sha1.update(key.as_bytes());
    sha1.update(GUID.as_bytes());
    BASE64.encode(sha1.finalize())
}

/// Builds the client's opening request.
pub fn request(host: &str, port: u16, path: &str, key: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Host: {}:{}\r\n\
         Sec-WebSocket-Key: {}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n",
        path, host, port, key
    )
}

/// Builds the server's 101 response for an accepted upgrade.
pub fn response(accept: &str) -> String {
    format!(
        "HTTP/1.1 101 Switching Protocols\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Accept: {}\r\n\
         \r\n",
        accept
    )
}

/// Validates the server's status line on the client side. The line must
/// parse as `<version> <status> <reason>` and the status must be exactly
/// 101, otherwise the handshake is rejected.
pub fn validate_status_line(line: &str) -> Result<()> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut parts = line.splitn(3, ' ');
    let (_version, status) = match (parts.next(), parts.next(), parts.next()) {
        (Some(version), Some(status), Some(_reason)) => (version, status),
        _ => {
            return Err(Error::HandshakeRejected(format!(
                "malformed status line: {:?}",
                line
            )))
        }
    };

    match status.parse::<u16>() {
        Ok(101) => Ok(()),
        Ok(code) => Err(Error::HandshakeRejected(format!(
            "server answered {} instead of 101",
            code
        ))),
        Err(_) => Err(Error::HandshakeRejected(format!(
            "malformed status line: {:?}",
            line
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_key_matches_rfc_vector() {
        // RFC 6455 section 1.3.
        assert_eq!(
            accept_key("dGhlIHNhbXBsZSBub25jZQ=="),
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
    }

    #[test]
    fn generated_keys_are_unique_16_byte_nonces() {
        let a = generate_key();
        let b = generate_key();
        assert_ne!(a, b);
        assert_eq!(BASE64.decode(&a).unwrap().len(), 16);
    }

    #[test]
    fn request_carries_upgrade_headers() {
        let req = request("localhost", 9001, "/chat", "abc123==");
        assert!(req.starts_with("GET /chat HTTP/1.1\r\n"));
        assert!(req.contains("Upgrade: websocket\r\n"));
        assert!(req.contains("Host: localhost:9001\r\n"));
        assert!(req.contains("Sec-WebSocket-Key: abc123==\r\n"));
        assert!(req.contains("Sec-WebSocket-Version: 13\r\n"));
        assert!(req.ends_with("\r\n\r\n"));
    }

    #[test]
    fn switching_protocols_is_accepted() {
        assert!(validate_status_line("HTTP/1.1 101 Switching Protocols\r\n").is_ok());
    }

    #[test]
    fn other_statuses_are_rejected() {
        for line in [
            "HTTP/1.1 200 OK\r\n",
            "HTTP/1.1 404 Not Found\r\n",
            "nonsense\r\n",
            "HTTP/1.1 abc def\r\n",
        ] {
            assert!(matches!(
                validate_status_line(line),
                Err(Error::HandshakeRejected(_))
            ));
        }
    }
}
