//! `RelayServer` builder and accept loop.
//!
//! This is the entry point for running a relay. It ties together all the
//! layers: transport → protocol → session → room.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use roomrelay_protocol::{Codec, JsonCodec};
use roomrelay_room::RoomConfig;
use roomrelay_session::Authenticator;
use roomrelay_transport::{
    Accepted, OriginPolicy, Transport, WebSocketTransport,
};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};

use crate::handler::handle_connection;
use crate::health::{HEALTH_PATH, health_listener, health_routes};
use crate::{Lobby, RelayError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. All room
/// and session state sits behind the single lobby mutex.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) lobby: Mutex<Lobby>,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) handshake_timeout: Duration,
}

/// Builder for configuring and starting a relay server.
///
/// # Example
///
/// ```rust,no_run
/// use roomrelay::prelude::*;
///
/// # async fn start() -> Result<(), RelayError> {
/// let server = RelayServer::builder()
///     .bind("0.0.0.0:4000")
///     .max_room_size(8)
///     .build(DisplayNameAuthenticator)
///     .await?;
/// server.run().await
/// # }
/// ```
#[must_use = "builder does nothing until you call build()"]
pub struct RelayServerBuilder {
    bind_addr: String,
    origins: OriginPolicy,
    room_config: RoomConfig,
    handshake_timeout: Duration,
}

impl RelayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            origins: defaults.client_origin,
            room_config: RoomConfig::default(),
            handshake_timeout: defaults.handshake_timeout,
        }
    }

    /// Starts from a loaded [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.ws_addr())
            .origins(config.client_origin.clone())
            .max_room_size(config.max_room_size)
            .handshake_timeout(config.handshake_timeout)
    }

    /// Sets the address to bind the WebSocket listener to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Restricts which browser origins may connect.
    pub fn origins(mut self, origins: OriginPolicy) -> Self {
        self.origins = origins;
        self
    }

    /// Sets the whole room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the member cap per room.
    pub fn max_room_size(mut self, max: usize) -> Self {
        self.room_config.max_room_size = max.max(1);
        self
    }

    /// How long a new connection has to send its handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`. `GET /health` is served on
    /// the same listener.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<RelayServer<A, JsonCodec>, RelayError> {
        let health = health_routes(Instant::now(), &self.origins);
        let transport =
            WebSocketTransport::bind_with(&self.bind_addr, self.origins)
                .await?
                .with_http_paths([HEALTH_PATH]);

        let state = Arc::new(ServerState {
            lobby: Mutex::new(Lobby::new(self.room_config)),
            auth,
            codec: JsonCodec,
            handshake_timeout: self.handshake_timeout,
        });

        Ok(RelayServer {
            transport,
            state,
            health,
        })
    }
}

impl Default for RelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound relay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RelayServer<A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
    health: Router,
}

impl RelayServer<roomrelay_session::DisplayNameAuthenticator, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> RelayServerBuilder {
        RelayServerBuilder::new()
    }
}

impl<A, C> RelayServer<A, C>
where
    A: Authenticator,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop and the health route.
    ///
    /// Each accepted peer is upgraded on its own task, so a peer that never
    /// finishes its upgrade only holds up itself. Failed upgrades are logged
    /// and skipped. Runs until the task is dropped.
    pub async fn run(self) -> Result<(), RelayError> {
        let Self {
            transport,
            state,
            health,
        } = self;
        let local = transport.local_addr().map_err(RelayError::Listener)?;
        let (handoff, listener) = health_listener(local);
        tracing::info!(addr = %local, "relay server running");

        tokio::select! {
            result = axum::serve(listener, health).into_future() => {
                result.map_err(RelayError::Listener)
            }
            _ = accept_loop(transport, state, handoff) => Ok(()),
        }
    }
}

async fn accept_loop<A, C>(
    mut transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
    handoff: mpsc::Sender<(TcpStream, SocketAddr)>,
) where
    A: Authenticator,
    C: Codec,
{
    loop {
        let pending = match transport.accept().await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };
        let state = Arc::clone(&state);
        let handoff = handoff.clone();
        tokio::spawn(async move {
            let peer = pending.peer_addr();
            match pending.upgrade().await {
                Ok(Accepted::WebSocket(conn)) => {
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(
                            error = %e,
                            "connection ended with error"
                        );
                    }
                }
                Ok(Accepted::Http { stream, peer }) => {
                    if handoff.send((stream, peer)).await.is_err() {
                        tracing::debug!(%peer, "health route is gone");
                    }
                }
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "upgrade failed");
                }
            }
        });
    }
}
