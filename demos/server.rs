//! Echo server: text messages come back with an `echoback: ` prefix, and
//! plain HTTP requests get a small status page.
//!
//! Run with `RUST_LOG=debug cargo run --example echo_server`.

use bytes::Bytes;
use ws_stream::{Connection, HttpRequest, HttpResponder, Server, SessionHandler};

struct EchoCallbacks;

impl SessionHandler for EchoCallbacks {
    fn on_client_connected(&self, conn: &Connection) {
        log::debug!("{} connected", conn);
    }

    fn on_client_left(&self, conn: &Connection) {
        log::debug!("{} left", conn);
    }

    fn on_bytes_message_received(&self, conn: &Connection, msg: Bytes) {
        log::debug!("{} <= {} bytes", conn, msg.len());
    }

    fn on_text_message_received(&self, conn: &Connection, msg: &str) {
        log::debug!("{} <= {}", conn, msg);
        let response = format!("echoback: {}", msg);
        log::debug!("{} => {}", conn, response);
        if let Err(err) = conn.send_text(&response) {
            log::error!("{} send failed: {}", conn, err);
        }
    }

    fn on_ping_received(&self, conn: &Connection, msg: &str) {
        log::debug!("{} ping {:?}", conn, msg);
        let _ = conn.send_pong(msg);
    }

    fn on_pong_received(&self, conn: &Connection, msg: &str) {
        log::debug!("{} pong {:?}", conn, msg);
    }
}

struct StatusPage;

impl HttpResponder for StatusPage {
    fn respond(&self, request: &HttpRequest) -> Vec<u8> {
        log::debug!("http {} {}", request.method, request.path);
        let body = b"<html><body>websocket echo server</body></html>";
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let server = Server::bind(("0.0.0.0", 8080), EchoCallbacks, StatusPage).await?;
    server.run().await?;
    Ok(())
}
