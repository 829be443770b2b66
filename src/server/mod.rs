//! Server-side orchestration: accept connections, complete the upgrade
//! handshake, and hand established transports to the session loop.
//! Requests without an `Upgrade` header go to the [`HttpResponder`].

use crate::handler::SessionHandler;
use crate::session::{self, Role};
use crate::{handshake, Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

mod http;
pub use http::{HttpRequest, HttpResponder, NotFound};

/// A WebSocket server bound to a local address.
pub struct Server<H, S> {
    listener: TcpListener,
    handler: Arc<H>,
    http: Arc<S>,
}

impl<H, S> Server<H, S>
where
    H: SessionHandler + Send + Sync + 'static,
    S: HttpResponder + Send + Sync + 'static,
{
    pub async fn bind(addr: impl ToSocketAddrs, handler: H, http: S) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            handler: Arc::new(handler),
            http: Arc::new(http),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Each connection runs on its own task; a failed
    /// connection is logged and never affects the others.
    pub async fn run(self) -> Result<()> {
        log::info!("listening on {}", self.listener.local_addr()?);
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let handler = self.handler.clone();
            let http = self.http.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, peer, handler, http).await {
                    log::error!("({}) connection error: {}", peer, err);
                }
            });
        }
    }
}

async fn handle_connection<H, S>(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<H>,
    http: Arc<S>,
) -> Result<()>
where
    H: SessionHandler,
    S: HttpResponder,
{
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let request = match HttpRequest::read(&mut reader).await? {
        Some(request) => request,
        // Peer connected and went away without a request.
        None => return Ok(()),
    };

    if request.header("upgrade").is_some() {
        let key = request.header("sec-websocket-key").ok_or_else(|| {
            Error::HandshakeRejected("upgrade request without Sec-WebSocket-Key".into())
        })?;
        let response = handshake::response(&handshake::accept_key(key));
        write_half.write_all(response.as_bytes()).await?;

        log::debug!("({}) switching to websocket", peer);
        session::run(
            reader,
            write_half,
            peer.to_string(),
            Role::Server,
            handler.as_ref(),
        )
        .await
    } else {
        let response = http.respond(&request);
        write_half.write_all(&response).await?;
        write_half.shutdown().await?;
        Ok(())
    }
}
