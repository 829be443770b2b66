//! WebSocket frame codec (RFC 6455 section 5.2).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! |     Extended payload length continued, if payload len == 127  |
//! + - - - - - - - - - - - - - - - +-------------------------------+
//! |                               |Masking-key, if MASK set to 1  |
//! +-------------------------------+-------------------------------+
//! | Masking-key (continued)       |          Payload Data         |
//! +-------------------------------- - - - - - - - - - - - - - - - +
//! ```

use crate::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

mod mask;
pub use mask::apply_mask;

const FIN: u8 = 0x80;
const OPCODE_MASK: u8 = 0x0f;
const MASKED: u8 = 0x80;
const PAYLOAD_LEN: u8 = 0x7f;
const PAYLOAD_LEN_EXT16: u8 = 126;
const PAYLOAD_LEN_EXT64: u8 = 127;

/// Payload bytes are pulled off the transport in chunks of at most this
/// size, so a large declared length never turns into one giant read.
const READ_CHUNK: usize = 64 * 1024;

/// Frame opcode (RFC 6455 section 5.2). Values 0x3-0x7 and 0xB-0xF are
/// reserved and rejected at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0x0 => Ok(Opcode::Continuation),
            0x1 => Ok(Opcode::Text),
            0x2 => Ok(Opcode::Binary),
            0x8 => Ok(Opcode::Close),
            0x9 => Ok(Opcode::Ping),
            0xA => Ok(Opcode::Pong),
            _ => Err(Error::InvalidOpcode(value)),
        }
    }

    /// Close, ping and pong. Control frames are never fragmented.
    pub const fn is_control(self) -> bool {
        matches!(self, Opcode::Close | Opcode::Ping | Opcode::Pong)
    }
}

/// One decoded frame. The payload is already unmasked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: Opcode,
    pub payload: Bytes,
}

/// Serializes one frame into a single contiguous buffer.
///
/// The FIN bit is always set; fragmented output is never produced. When
/// `mask` is given (client role) the key is written after the length and
/// the payload is XOR-masked in place. Returning one buffer keeps the
/// header + key + payload write atomic at the transport level.
pub fn encode_frame(opcode: Opcode, payload: &[u8], mask: Option<[u8; 4]>) -> Result<Bytes> {
    let len = u64::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge)?;

    let mut buf = BytesMut::with_capacity(payload.len() + 14);
    buf.put_u8(FIN | opcode as u8);

    let mask_bit = if mask.is_some() { MASKED } else { 0 };
    if len <= 125 {
        buf.put_u8(mask_bit | len as u8);
    } else if len <= u64::from(u16::MAX) {
        buf.put_u8(mask_bit | PAYLOAD_LEN_EXT16);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(mask_bit | PAYLOAD_LEN_EXT64);
        buf.put_u64(len);
    }

    match mask {
        Some(key) => {
            buf.put_slice(&key);
            let start = buf.len();
            buf.put_slice(payload);
            apply_mask(key, &mut buf[start..]);
        }
        None => buf.put_slice(payload),
    }

    Ok(buf.freeze())
}

/// Reads exactly one frame from the transport.
///
/// Returns `Ok(None)` on a clean EOF at a frame boundary. EOF anywhere
/// inside the declared payload is [`Error::TruncatedPayload`]; EOF inside
/// the header is an IO error. Masked payloads are unmasked before the
/// frame is returned. Close frames take the same path as data frames so
/// the stream stays in sync.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut byte0 = [0u8; 1];
    if reader.read(&mut byte0).await? == 0 {
        return Ok(None);
    }
    let mut byte1 = [0u8; 1];
    reader.read_exact(&mut byte1).await?;

    let fin = byte0[0] & FIN != 0;
    let opcode = Opcode::from_u8(byte0[0] & OPCODE_MASK)?;
    let masked = byte1[0] & MASKED != 0;

    let mut payload_length = u64::from(byte1[0] & PAYLOAD_LEN);
    if payload_length == u64::from(PAYLOAD_LEN_EXT16) {
        let mut ext = [0u8; 2];
        reader.read_exact(&mut ext).await?;
        payload_length = u64::from(u16::from_be_bytes(ext));
    } else if payload_length == u64::from(PAYLOAD_LEN_EXT64) {
        let mut ext = [0u8; 8];
        reader.read_exact(&mut ext).await?;
        payload_length = u64::from_be_bytes(ext);
    }

    let mask = if masked {
        let mut key = [0u8; 4];
        reader.read_exact(&mut key).await?;
        Some(key)
    } else {
        None
    };

    let mut payload = read_payload(reader, payload_length).await?;
    if let Some(key) = mask {
        apply_mask(key, &mut payload);
    }

    Ok(Some(Frame {
        fin,
        opcode,
        payload: payload.freeze(),
    }))
}

/// Accumulates exactly `expected` payload bytes, looping in bounded
/// chunks; a single read is never assumed to satisfy the full length.
async fn read_payload<R>(reader: &mut R, expected: u64) -> Result<BytesMut>
where
    R: AsyncRead + Unpin,
{
    let chunk = expected.min(READ_CHUNK as u64) as usize;
    let mut payload = BytesMut::with_capacity(chunk);
    if chunk == 0 {
        return Ok(payload);
    }

    let mut scratch = vec![0u8; chunk];
    let mut remaining = expected;
    while remaining > 0 {
        let want = remaining.min(scratch.len() as u64) as usize;
        let n = reader.read(&mut scratch[..want]).await?;
        if n == 0 {
            return Err(Error::TruncatedPayload {
                expected,
                received: expected - remaining,
            });
        }
        payload.extend_from_slice(&scratch[..n]);
        remaining -= n as u64;
    }
    Ok(payload)
}
