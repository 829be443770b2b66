//! Client-side orchestration: open the transport, negotiate the upgrade,
//! then drive the session until the connection ends.

use crate::handler::SessionHandler;
use crate::session::{self, Role};
use crate::{handshake, Error, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Connects to `ws://host:port{path}`, performs the opening handshake and
/// runs the session, dispatching events to `handler` until the connection
/// closes. Returns once the session has ended.
pub async fn connect<H>(host: &str, port: u16, path: &str, handler: &H) -> Result<()>
where
    H: SessionHandler,
{
    log::debug!("connect {}:{}{}", host, port, path);
    let stream = TcpStream::connect((host, port)).await?;
    let (read_half, mut write_half) = stream.into_split();

    let key = handshake::generate_key();
    let request = handshake::request(host, port, path, &key);
    write_half.write_all(request.as_bytes()).await?;

    let mut reader = BufReader::new(read_half);
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await?;
    handshake::validate_status_line(&status_line)?;

    // Consume the response headers up to the blank line, picking out the
    // accept token to check against the key we sent.
    let mut accept = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(Error::HandshakeRejected(
                "response ended before the header terminator".into(),
            ));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        log::trace!("{}", line);
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("sec-websocket-accept") {
                accept = Some(value.trim().to_string());
            }
        }
    }

    match accept {
        Some(token) if token == handshake::accept_key(&key) => {}
        Some(_) => {
            return Err(Error::HandshakeRejected(
                "Sec-WebSocket-Accept does not match the key".into(),
            ))
        }
        None => {
            return Err(Error::HandshakeRejected(
                "response is missing Sec-WebSocket-Accept".into(),
            ))
        }
    }

    log::debug!("switch to websocket");
    session::run(
        reader,
        write_half,
        format!("{}:{}", host, port),
        Role::Client,
        handler,
    )
    .await
}
