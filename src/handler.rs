use crate::session::Connection;
use bytes::Bytes;

/// Application callbacks for one connection's lifecycle.
///
/// All six events are required. Each is invoked synchronously from the
/// connection's own task and may call the [`Connection`] send operations,
/// which only enqueue the encoded frame and never block.
pub trait SessionHandler {
    /// The handshake completed and the session is open.
    fn on_client_connected(&self, conn: &Connection);

    /// The session ended: clean close, protocol violation, or transport
    /// failure. Fired exactly once per connection.
    fn on_client_left(&self, conn: &Connection);

    /// A complete binary message arrived.
    fn on_bytes_message_received(&self, conn: &Connection, msg: Bytes);

    /// A complete text message arrived.
    fn on_text_message_received(&self, conn: &Connection, msg: &str);

    /// A ping control frame arrived. Answering is up to the application
    /// (`conn.send_pong`).
    fn on_ping_received(&self, conn: &Connection, msg: &str);

    /// A pong control frame arrived.
    fn on_pong_received(&self, conn: &Connection, msg: &str);
}
