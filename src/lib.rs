mod error;
pub use error::{Error, Result};

pub mod frame;

pub mod handshake;

mod message;
pub use message::Message;

mod handler;
pub use handler::SessionHandler;

pub mod session;
pub use session::{Connection, Role, NORMAL_CLOSURE};

pub mod client;

mod server;
pub use server::{HttpRequest, HttpResponder, NotFound, Server};
