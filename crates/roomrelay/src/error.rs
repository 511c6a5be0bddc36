//! Unified error type for the relay server.

use roomrelay_protocol::ProtocolError;
use roomrelay_room::RoomError;
use roomrelay_session::SessionError;
use roomrelay_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad handshake).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (rejected name, duplicate id).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The listener failed outside a single connection (address lookup,
    /// the HTTP side of the health route).
    #[error("listener failed: {0}")]
    Listener(#[source] std::io::Error),
}
