//! Error types for the session layer.

use roomrelay_protocol::ConnectionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The handshake was refused by the [`Authenticator`](crate::Authenticator).
    #[error("handshake rejected: {0}")]
    Rejected(String),

    /// No session exists for the given connection.
    /// Usually means teardown already ran for it.
    #[error("session not found for {0}")]
    NotFound(ConnectionId),

    /// A session is already registered under this connection id.
    #[error("{0} already has a session")]
    AlreadyConnected(ConnectionId),
}
