//! Error types for the client adapter.

use std::time::Duration;

use roomrelay_protocol::{ErrorCode, ProtocolError};
use tokio_tungstenite::tungstenite;

/// Errors surfaced by [`LobbyClient`](crate::LobbyClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The WebSocket layer failed (DNS, TCP, upgrade, I/O).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The server answered the handshake with `connect_error`.
    /// Not retried: the same handshake would be refused again.
    #[error("connection refused by server: {0}")]
    Refused(String),

    /// Every connection attempt failed.
    #[error("could not connect after {attempts} attempt(s): {last}")]
    ConnectFailed { attempts: u32, last: String },

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server refused a room request.
    #[error("room request failed: {0}")]
    Room(ErrorCode),

    /// No acknowledgement arrived in time.
    #[error("no reply to {event} within {timeout:?}")]
    AckTimeout {
        event: &'static str,
        timeout: Duration,
    },

    /// There is no live connection.
    #[error("not connected")]
    NotConnected,

    /// The connection closed while waiting for a reply.
    #[error("connection closed")]
    Closed,
}

/// Outcome of a finished connection attempt, kept so callers that were
/// waiting on the same attempt get the same answer.
#[derive(Debug, Clone)]
pub(crate) enum AttemptFailure {
    Refused(String),
    Exhausted { attempts: u32, last: String },
}

impl From<AttemptFailure> for ClientError {
    fn from(failure: AttemptFailure) -> Self {
        match failure {
            AttemptFailure::Refused(message) => Self::Refused(message),
            AttemptFailure::Exhausted { attempts, last } => {
                Self::ConnectFailed { attempts, last }
            }
        }
    }
}
