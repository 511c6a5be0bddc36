//! Per-connection handler: handshake, writer task, and command loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `handshake` → check version, resolve display name
//!   2. Register with the lobby → `session:ready` is queued
//!   3. Spawn the writer task that drains the outbound channel
//!   4. Loop: receive frames → hand them to the lobby
//!
//! There is no idle timeout after the handshake. A connection lives until
//! the peer closes it or the socket errors.

use std::sync::Arc;

use roomrelay_protocol::{
    ClientCommand, ClientFrame, Codec, ConnectErrorInfo, ConnectionId,
    PROTOCOL_VERSION, ProtocolError, ServerEvent, ServerFrame,
};
use roomrelay_session::Authenticator;
use roomrelay_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::RelayError;
use crate::server::ServerState;

/// Drop guard that tears down a connection's lobby state when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct SessionGuard<A: Authenticator, C: Codec> {
    id: ConnectionId,
    state: Arc<ServerState<A, C>>,
}

impl<A: Authenticator, C: Codec> Drop for SessionGuard<A, C> {
    fn drop(&mut self) {
        let id = self.id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.lobby.lock().await.disconnect(id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), RelayError>
where
    A: Authenticator,
    C: Codec,
{
    let conn = Arc::new(conn);
    let id = conn.id();
    tracing::debug!(%id, peer = %conn.peer_addr(), "handling new connection");

    // --- Step 1: Handshake ---
    let name = perform_handshake(&conn, &state).await?;

    // --- Step 2: Register, start writing ---
    let (tx, rx) = mpsc::unbounded_channel();
    state.lobby.lock().await.connect(id, name, tx)?;
    let _guard = SessionGuard {
        id,
        state: Arc::clone(&state),
    };
    tokio::spawn(write_outbound(Arc::clone(&conn), rx, Arc::clone(&state)));

    // --- Step 3: Command loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%id, error = %e, "recv error");
                break;
            }
        };

        let frame: ClientFrame = match state.codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%id, error = %e, "failed to decode frame");
                continue;
            }
        };

        state.lobby.lock().await.handle(id, frame);
    }

    // _guard drops here → lobby disconnect fires, which detaches the
    // outbound sender and lets the writer task finish.
    Ok(())
}

/// Drains a connection's outbound channel into its socket.
///
/// Ends when the lobby drops the sender or the socket stops accepting
/// writes.
async fn write_outbound<A, C>(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerFrame>,
    state: Arc<ServerState<A, C>>,
) where
    A: Authenticator,
    C: Codec,
{
    let id = conn.id();
    while let Some(frame) = rx.recv().await {
        let bytes = match state.codec.encode(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to encode frame");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%id, error = %e, "send failed, stopping writer");
            break;
        }
    }
    let _ = conn.close().await;
}

/// Receives and checks the `handshake` frame. Returns the display name.
async fn perform_handshake<A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<A, C>,
) -> Result<String, RelayError>
where
    A: Authenticator,
    C: Codec,
{
    let data =
        match tokio::time::timeout(state.handshake_timeout, conn.recv()).await
        {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                return Err(invalid("connection closed before handshake"));
            }
            Ok(Err(e)) => return Err(RelayError::Transport(e)),
            Err(_) => {
                send_connect_error(conn, &state.codec, "handshake timed out")
                    .await?;
                return Err(invalid("handshake timed out"));
            }
        };

    let frame: ClientFrame = match state.codec.decode(&data) {
        Ok(frame) => frame,
        Err(e) => {
            send_connect_error(conn, &state.codec, "malformed handshake")
                .await?;
            return Err(e.into());
        }
    };

    let handshake = match frame.command() {
        Ok(ClientCommand::Handshake(handshake)) => handshake,
        _ => {
            send_connect_error(conn, &state.codec, "expected handshake")
                .await?;
            return Err(invalid("first frame must be a handshake"));
        }
    };

    if handshake.version != PROTOCOL_VERSION {
        send_connect_error(
            conn,
            &state.codec,
            &format!(
                "version mismatch: expected {PROTOCOL_VERSION}, got {}",
                handshake.version
            ),
        )
        .await?;
        return Err(invalid("protocol version mismatch"));
    }

    match state.auth.authenticate(handshake.name.as_deref()).await {
        Ok(name) => Ok(name),
        Err(e) => {
            send_connect_error(conn, &state.codec, &e.to_string()).await?;
            Err(e.into())
        }
    }
}

/// Sends `connect_error` and closes the connection.
async fn send_connect_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    message: &str,
) -> Result<(), RelayError> {
    let frame = ServerFrame::Push(ServerEvent::ConnectError(ConnectErrorInfo {
        message: message.to_string(),
    }));
    let bytes = codec.encode(&frame)?;
    conn.send(&bytes).await?;
    let _ = conn.close().await;
    Ok(())
}

fn invalid(reason: &str) -> RelayError {
    RelayError::Protocol(ProtocolError::InvalidMessage(reason.to_string()))
}
