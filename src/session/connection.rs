use crate::frame::{encode_frame, Opcode};
use crate::{Error, Result};
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Close status code for a normal closure (RFC 6455 section 7.4.1).
pub const NORMAL_CLOSURE: u16 = 1000;

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Send handle for one established connection.
///
/// Cheap to clone; all clones share the connection state. Send operations
/// encode the frame immediately (so [`Error::PayloadTooLarge`] surfaces to
/// the caller) and enqueue it for the connection's single writer task, so
/// header, mask key and payload always reach the transport as one unit.
#[derive(Clone)]
pub struct Connection {
    peer: Arc<str>,
    frames: UnboundedSender<Bytes>,
    mask: bool,
    state: Arc<AtomicU8>,
}

impl Connection {
    pub(crate) fn new(peer: String, frames: UnboundedSender<Bytes>, mask: bool) -> Self {
        Self {
            peer: peer.into(),
            frames,
            mask,
            state: Arc::new(AtomicU8::new(OPEN)),
        }
    }

    /// The peer's `host:port` label, as used in log lines.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// False once a close frame has been sent or received, or the session
    /// has ended.
    pub fn is_open(&self) -> bool {
        self.state.load(Ordering::Acquire) == OPEN
    }

    pub fn send_text(&self, msg: &str) -> Result<()> {
        self.send(Opcode::Text, msg.as_bytes())
    }

    pub fn send_bytes(&self, payload: &[u8]) -> Result<()> {
        self.send(Opcode::Binary, payload)
    }

    pub fn send_ping(&self, msg: &str) -> Result<()> {
        self.send(Opcode::Ping, msg.as_bytes())
    }

    pub fn send_pong(&self, msg: &str) -> Result<()> {
        self.send(Opcode::Pong, msg.as_bytes())
    }

    /// Sends a close frame: 2-byte big-endian status code plus an optional
    /// reason. Moves the connection to the closing state; only the first
    /// close wins, and later sends fail with [`Error::ConnectionClosed`].
    pub fn send_close(&self, status: u16, reason: &[u8]) -> Result<()> {
        if self
            .state
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::ConnectionClosed);
        }

        let mut payload = Vec::with_capacity(2 + reason.len());
        payload.extend_from_slice(&status.to_be_bytes());
        payload.extend_from_slice(reason);
        self.enqueue(Opcode::Close, &payload)
    }

    pub(crate) fn mark_closed(&self) {
        self.state.store(CLOSED, Ordering::Release);
    }

    fn send(&self, opcode: Opcode, payload: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(Error::ConnectionClosed);
        }
        self.enqueue(opcode, payload)
    }

    fn enqueue(&self, opcode: Opcode, payload: &[u8]) -> Result<()> {
        // Clients mask every outgoing frame with a fresh random key.
        let key: Option<[u8; 4]> = self.mask.then(rand::random);
        let frame = encode_frame(opcode, payload, key)?;
        self.frames.send(frame).map_err(|_| Error::ConnectionClosed)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.peer)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("mask", &self.mask)
            .finish()
    }
}
