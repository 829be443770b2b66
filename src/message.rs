//! Reassembly of fragmented messages (RFC 6455 section 5.4).

use crate::frame::{Frame, Opcode};
use crate::{Error, Result};
use bytes::{Bytes, BytesMut};

/// One complete logical message, reassembled from one or more data frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    Binary(Bytes),
}

enum State {
    Idle,
    Accumulating { opcode: Opcode, chunks: Vec<Bytes> },
}

/// Folds a sequence of data frames into messages.
///
/// "No message open" is a real state, not an empty chunk list: a
/// continuation frame in `Idle` and a fresh text/binary frame in
/// `Accumulating` are both protocol errors. Control frames never pass
/// through here.
pub struct Reassembler {
    state: State,
}

impl Reassembler {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Feeds one decoded data frame. Returns a completed [`Message`] when
    /// the frame carried the FIN bit, `None` while accumulation continues.
    pub fn push(&mut self, frame: Frame) -> Result<Option<Message>> {
        debug_assert!(!frame.opcode.is_control());

        match (&mut self.state, frame.opcode) {
            (State::Idle, Opcode::Continuation) => return Err(Error::UnexpectedContinuation),
            (State::Accumulating { .. }, Opcode::Text | Opcode::Binary) => {
                return Err(Error::InterleavedMessage)
            }
            (State::Idle, opcode) => {
                self.state = State::Accumulating {
                    opcode,
                    chunks: vec![frame.payload],
                };
            }
            (State::Accumulating { chunks, .. }, Opcode::Continuation) => {
                chunks.push(frame.payload);
            }
            (State::Accumulating { .. }, _) => unreachable!(),
        }

        if !frame.fin {
            return Ok(None);
        }

        let State::Accumulating { opcode, chunks } = std::mem::replace(&mut self.state, State::Idle)
        else {
            unreachable!()
        };

        let payload = concat(chunks);
        let message = match opcode {
            Opcode::Text => Message::Text(String::from_utf8(payload.to_vec())?),
            _ => Message::Binary(payload),
        };
        Ok(Some(message))
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

fn concat(mut chunks: Vec<Bytes>) -> Bytes {
    // Single-fragment messages are the common case; skip the copy.
    if chunks.len() == 1 {
        return chunks.pop().unwrap();
    }
    let mut joined = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
    for chunk in chunks {
        joined.extend_from_slice(&chunk);
    }
    joined.freeze()
}
