use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::string::FromUtf8Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while negotiating, framing, or running a
/// WebSocket connection.
#[derive(Debug)]
pub enum Error {
    /// The peer's handshake was malformed or did not switch protocols.
    HandshakeRejected(String),
    /// A frame header carried one of the reserved opcode values.
    InvalidOpcode(u8),
    /// A continuation frame arrived with no fragmented message open.
    UnexpectedContinuation,
    /// A new data frame arrived while a fragmented message was still open.
    InterleavedMessage,
    /// A control frame (close, ping, pong) arrived with the FIN bit clear.
    FragmentedControlFrame,
    /// The stream ended before the declared payload length was satisfied.
    TruncatedPayload { expected: u64, received: u64 },
    /// A text payload was not valid UTF-8.
    InvalidUtf8(FromUtf8Error),
    /// The payload length cannot be represented in the 64-bit length field.
    PayloadTooLarge,
    /// A send was attempted after the connection left the open state.
    ConnectionClosed,
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::HandshakeRejected(reason) => write!(f, "handshake rejected: {}", reason),
            Error::InvalidOpcode(value) => write!(f, "invalid opcode {:#x}", value),
            Error::UnexpectedContinuation => {
                f.write_str("continuation frame without an open message")
            }
            Error::InterleavedMessage => {
                f.write_str("new data frame while a fragmented message is open")
            }
            Error::FragmentedControlFrame => f.write_str("fragmented control frame"),
            Error::TruncatedPayload { expected, received } => write!(
                f,
                "stream ended after {} of {} payload bytes",
                received, expected
            ),
            Error::InvalidUtf8(err) => write!(f, "invalid UTF-8 in text payload: {}", err),
            Error::PayloadTooLarge => f.write_str("payload too large for the 64-bit length field"),
            Error::ConnectionClosed => f.write_str("connection is closed"),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::InvalidUtf8(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Self {
        Error::InvalidUtf8(err)
    }
}
