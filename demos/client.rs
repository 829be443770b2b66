//! Echo client: sends `hello`, prints the echo, closes.
//!
//! Run with `RUST_LOG=debug cargo run --example echo_client` against a
//! running echo server.

use bytes::Bytes;
use ws_stream::{client, Connection, SessionHandler, NORMAL_CLOSURE};

struct EchoClient;

impl SessionHandler for EchoClient {
    fn on_client_connected(&self, conn: &Connection) {
        log::debug!("{} connected", conn);
        if let Err(err) = conn.send_text("hello") {
            log::error!("{} send failed: {}", conn, err);
        }
    }

    fn on_client_left(&self, conn: &Connection) {
        log::debug!("{} left", conn);
    }

    fn on_bytes_message_received(&self, conn: &Connection, msg: Bytes) {
        log::debug!("{} <= {} bytes", conn, msg.len());
    }

    fn on_text_message_received(&self, conn: &Connection, msg: &str) {
        log::debug!("{} <= {}", conn, msg);
        let _ = conn.send_close(NORMAL_CLOSURE, b"");
    }

    fn on_ping_received(&self, conn: &Connection, msg: &str) {
        log::debug!("{} ping {:?}", conn, msg);
    }

    fn on_pong_received(&self, conn: &Connection, msg: &str) {
        log::debug!("{} pong {:?}", conn, msg);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    client::connect("127.0.0.1", 8080, "/", &EchoClient).await?;
    log::debug!("end");
    Ok(())
}
