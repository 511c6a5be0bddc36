//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::{StatusCode, header};
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Connection, ConnectionId, OriginPolicy, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How long a TCP peer gets to complete the WebSocket upgrade.
const UPGRADE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between peeks while a request line is still arriving.
const PEEK_INTERVAL: Duration = Duration::from_millis(5);

/// Bytes peeked when looking for the request line.
const PEEK_LIMIT: usize = 1024;

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
///
/// `accept()` only takes the TCP connection. The HTTP upgrade happens in
/// [`PendingUpgrade::upgrade`], which callers run on the peer's own task so
/// a slow peer never holds up the listener.
pub struct WebSocketTransport {
    listener: TcpListener,
    origins: Arc<OriginPolicy>,
    http_paths: Arc<[String]>,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address, accepting any
    /// origin.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        Self::bind_with(addr, OriginPolicy::Any).await
    }

    /// Binds a new WebSocket transport that only upgrades requests whose
    /// `Origin` passes `origins`.
    pub async fn bind_with(
        addr: &str,
        origins: OriginPolicy,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, ?origins, "WebSocket transport listening");
        Ok(Self {
            listener,
            origins: Arc::new(origins),
            http_paths: Arc::from(Vec::new()),
        })
    }

    /// Request paths that are plain HTTP rather than WebSocket upgrades.
    ///
    /// Peers asking for one of these come back from
    /// [`PendingUpgrade::upgrade`] as [`Accepted::Http`] with the request
    /// still unread.
    pub fn with_http_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.http_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Pending = PendingUpgrade;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::trace!(%peer, "accepted TCP connection");
        Ok(PendingUpgrade {
            stream,
            peer,
            origins: Arc::clone(&self.origins),
            http_paths: Arc::clone(&self.http_paths),
        })
    }
}

/// What an accepted peer turned out to be.
pub enum Accepted {
    /// A completed WebSocket upgrade.
    WebSocket(WebSocketConnection),
    /// A plain HTTP request for one of the transport's HTTP paths. Nothing
    /// has been read from `stream` yet.
    Http { stream: TcpStream, peer: SocketAddr },
}

/// A TCP peer whose WebSocket upgrade has not run yet.
pub struct PendingUpgrade {
    stream: TcpStream,
    peer: SocketAddr,
    origins: Arc<OriginPolicy>,
    http_paths: Arc<[String]>,
}

impl PendingUpgrade {
    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Reads the request and finishes the upgrade, checking `Origin`.
    ///
    /// # Errors
    /// - [`TransportError::Rejected`] when the origin is not allowed
    /// - [`TransportError::AcceptFailed`] when the peer times out or sends
    ///   something other than a valid upgrade
    pub async fn upgrade(self) -> Result<Accepted, TransportError> {
        let peer = self.peer;
        tokio::time::timeout(UPGRADE_TIMEOUT, self.route())
            .await
            .map_err(|_| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("upgrade from {peer} timed out"),
                ))
            })?
    }

    async fn route(self) -> Result<Accepted, TransportError> {
        if !self.http_paths.is_empty() {
            if let Some(path) = request_path(&self.stream).await? {
                if self.http_paths.iter().any(|p| *p == path) {
                    tracing::trace!(peer = %self.peer, %path, "plain HTTP request");
                    return Ok(Accepted::Http {
                        stream: self.stream,
                        peer: self.peer,
                    });
                }
            }
        }
        self.handshake().await.map(Accepted::WebSocket)
    }

    async fn handshake(self) -> Result<WebSocketConnection, TransportError> {
        let Self {
            stream,
            peer,
            origins,
            ..
        } = self;

        let check_origin =
            |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let origin = req
                    .headers()
                    .get(header::ORIGIN)
                    .and_then(|v| v.to_str().ok());
                if origins.allows(origin) {
                    Ok(resp)
                } else {
                    tracing::warn!(%peer, ?origin, "origin not allowed");
                    let mut denied =
                        ErrorResponse::new(Some("origin not allowed".into()));
                    *denied.status_mut() = StatusCode::FORBIDDEN;
                    Err(denied)
                }
            };

        let ws = match tokio_tungstenite::accept_hdr_async(stream, check_origin)
            .await
        {
            Ok(ws) => ws,
            Err(tungstenite::Error::Http(resp))
                if resp.status() == StatusCode::FORBIDDEN =>
            {
                return Err(TransportError::Rejected(format!(
                    "origin refused for {peer}"
                )));
            }
            Err(e) => {
                return Err(TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                )));
            }
        };

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "accepted WebSocket connection");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            peer,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// Peeks at the request line and returns its path, without consuming
/// anything. `None` when the peer closed or sent no parseable line.
async fn request_path(
    stream: &TcpStream,
) -> Result<Option<String>, TransportError> {
    let mut buf = [0u8; PEEK_LIMIT];
    loop {
        let n = stream
            .peek(&mut buf)
            .await
            .map_err(TransportError::AcceptFailed)?;
        if n == 0 {
            return Ok(None);
        }
        if let Some(end) = buf[..n].iter().position(|b| *b == b'\n') {
            return Ok(parse_request_path(&buf[..end]));
        }
        if n == buf.len() {
            return Ok(None);
        }
        tokio::time::sleep(PEEK_INTERVAL).await;
    }
}

/// `GET /health?x=1 HTTP/1.1` → `/health`.
fn parse_request_path(line: &[u8]) -> Option<String> {
    let line = std::str::from_utf8(line).ok()?;
    let target = line.split_whitespace().nth(1)?;
    let path = target.split('?').next().unwrap_or(target);
    Some(path.to_string())
}

/// A single WebSocket connection.
///
/// The socket is split so a writer task can push frames while the handler
/// is parked in [`recv`](Connection::recv).
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        // Codecs produce JSON, which goes out as text. Anything that is not
        // UTF-8 is sent as a binary frame rather than mangled.
        let message = match String::from_utf8(data.to_vec()) {
            Ok(text) => Message::Text(text.into()),
            Err(e) => Message::Binary(e.into_bytes().into()),
        };
        self.sink
            .lock()
            .await
            .send(message)
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        loop {
            let msg = self.stream.lock().await.next().await;
            match msg {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_path_strips_query() {
        assert_eq!(
            parse_request_path(b"GET /health?check=1 HTTP/1.1\r"),
            Some("/health".to_string())
        );
    }

    #[test]
    fn test_parse_request_path_root() {
        assert_eq!(
            parse_request_path(b"GET / HTTP/1.1\r"),
            Some("/".to_string())
        );
    }

    #[test]
    fn test_parse_request_path_garbage() {
        assert_eq!(parse_request_path(b"\xff\xfe"), None);
        assert_eq!(parse_request_path(b"GET"), None);
    }
}
