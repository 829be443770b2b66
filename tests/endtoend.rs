//! Full client/server round trips over a TCP loopback.

use bytes::Bytes;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use ws_stream::{client, Connection, NotFound, Server, SessionHandler, NORMAL_CLOSURE};

struct EchoServer;

impl SessionHandler for EchoServer {
    fn on_client_connected(&self, _conn: &Connection) {}
    fn on_client_left(&self, _conn: &Connection) {}
    fn on_bytes_message_received(&self, conn: &Connection, msg: Bytes) {
        conn.send_bytes(&msg).unwrap();
    }
    fn on_text_message_received(&self, conn: &Connection, msg: &str) {
        conn.send_text(&format!("echoback: {}", msg)).unwrap();
    }
    fn on_ping_received(&self, conn: &Connection, msg: &str) {
        conn.send_pong(msg).unwrap();
    }
    fn on_pong_received(&self, _conn: &Connection, _msg: &str) {}
}

#[derive(Default)]
struct EchoClient {
    received: Mutex<Vec<String>>,
}

impl SessionHandler for EchoClient {
    fn on_client_connected(&self, conn: &Connection) {
        conn.send_text("hello").unwrap();
    }
    fn on_client_left(&self, _conn: &Connection) {}
    fn on_bytes_message_received(&self, _conn: &Connection, _msg: Bytes) {}
    fn on_text_message_received(&self, conn: &Connection, msg: &str) {
        self.received.lock().unwrap().push(msg.to_string());
        conn.send_close(NORMAL_CLOSURE, b"").unwrap();
    }
    fn on_ping_received(&self, _conn: &Connection, _msg: &str) {}
    fn on_pong_received(&self, _conn: &Connection, _msg: &str) {}
}

#[tokio::test]
async fn text_echo_round_trip() {
    let server = Server::bind(("127.0.0.1", 0), EchoServer, NotFound)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let handler = EchoClient::default();
    timeout(
        Duration::from_secs(5),
        client::connect("127.0.0.1", addr.port(), "/", &handler),
    )
    .await
    .expect("client timed out")
    .unwrap();

    assert_eq!(
        *handler.received.lock().unwrap(),
        vec!["echoback: hello".to_string()]
    );
}

#[tokio::test]
async fn plain_http_request_takes_the_fallback_path() {
    let server = Server::bind(("127.0.0.1", 0), EchoServer, NotFound)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("server timed out")
        .unwrap();

    let response = String::from_utf8(response).unwrap();
    assert!(response.starts_with("HTTP/1.1 404 NOT FOUND\r\n"), "{}", response);
    assert!(response.ends_with("file not found"), "{}", response);
}
