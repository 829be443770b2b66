//! One established connection: the read loop, event dispatch, and the
//! single writer task that serializes all outgoing frames.

use crate::frame::{read_frame, Opcode};
use crate::handler::SessionHandler;
use crate::message::{Message, Reassembler};
use crate::{Error, Result};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver};

mod connection;
pub use connection::{Connection, NORMAL_CLOSURE};

/// Which side of the connection this endpoint is. Clients mask outgoing
/// frames; servers must not (RFC 6455 section 5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Drives one established connection until it closes.
///
/// Fires `on_client_connected` on entry and `on_client_left` exactly once
/// on exit, whether the session ends with a clean close frame, a protocol
/// violation, or a transport error. Protocol and IO errors stop the read
/// loop, are reported to the log, and are also returned to the caller;
/// they never affect other connections.
pub async fn run<R, W, H>(
    mut reader: R,
    writer: W,
    peer: String,
    role: Role,
    handler: &H,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    H: SessionHandler,
{
    let (frames, pending) = mpsc::unbounded_channel();
    // Single writer per connection: sends from the read loop's callbacks
    // and from any other task all funnel through the channel, so frame
    // writes can never interleave on the wire.
    tokio::spawn(write_loop(writer, pending));

    let conn = Connection::new(peer, frames, role == Role::Client);

    handler.on_client_connected(&conn);
    let result = read_loop(&mut reader, &conn, handler).await;
    if let Err(err) = &result {
        log::error!("{} session error: {}", conn, err);
    }

    conn.mark_closed();
    handler.on_client_left(&conn);
    result
}

async fn read_loop<R, H>(reader: &mut R, conn: &Connection, handler: &H) -> Result<()>
where
    R: AsyncRead + Unpin,
    H: SessionHandler,
{
    let mut reassembler = Reassembler::new();

    loop {
        let frame = match read_frame(reader).await? {
            Some(frame) => frame,
            None => {
                log::debug!("{} peer closed the transport", conn);
                return Ok(());
            }
        };

        if frame.opcode.is_control() && !frame.fin {
            return Err(Error::FragmentedControlFrame);
        }

        match frame.opcode {
            Opcode::Close => {
                log::debug!("{} peer asked to close the connection", conn);
                // Acknowledge the close unless we already initiated one.
                let _ = conn.send_close(NORMAL_CLOSURE, b"");
                return Ok(());
            }
            Opcode::Ping => {
                let msg = String::from_utf8(frame.payload.to_vec())?;
                handler.on_ping_received(conn, &msg);
            }
            Opcode::Pong => {
                let msg = String::from_utf8(frame.payload.to_vec())?;
                handler.on_pong_received(conn, &msg);
            }
            _ => {
                if let Some(message) = reassembler.push(frame)? {
                    match message {
                        Message::Text(text) => handler.on_text_message_received(conn, &text),
                        Message::Binary(bytes) => handler.on_bytes_message_received(conn, bytes),
                    }
                }
            }
        }
    }
}

/// Owns the transport write half. Each received buffer is one fully
/// encoded frame, written with a single `write_all`. Exits and shuts the
/// transport down once every `Connection` clone has been dropped.
async fn write_loop<W>(mut writer: W, mut pending: UnboundedReceiver<Bytes>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = pending.recv().await {
        if let Err(err) = writer.write_all(&frame).await {
            log::debug!("write side closed: {}", err);
            pending.close();
            break;
        }
    }
    let _ = writer.shutdown().await;
}
