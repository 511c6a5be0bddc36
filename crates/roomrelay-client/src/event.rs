//! Events a [`LobbyClient`](crate::LobbyClient) reports to subscribers.

use roomrelay_protocol::{
    ConnectionId, MemberRecord, RelayedEvent, RoomCode, SessionInfo,
};
use serde_json::{Map, Value};

/// Something that happened on the client's connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A connection (or reconnection) completed its handshake.
    Connected(SessionInfo),
    /// The room's member list changed.
    Players(Vec<MemberRecord>),
    /// Another member broadcast something. Metadata updates show up here
    /// too, in addition to [`ClientEvent::Metadata`].
    RoomEvent(RelayedEvent),
    /// A member's metadata changed. `metadata` is their merged state.
    Metadata {
        from: ConnectionId,
        metadata: Map<String, Value>,
    },
    /// The host left and the room is gone. The client does not rejoin.
    RoomClosed { code: Option<RoomCode> },
    /// The connection dropped.
    Disconnected,
}
