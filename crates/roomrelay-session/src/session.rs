//! Session types: the server's record of one live connection.
//!
//! A session tracks:
//! - WHO is on the other end (`ConnectionId`, display name)
//! - WHERE they are (lobby, or a room)

use roomrelay_protocol::{ConnectionId, RoomCode};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a connection currently is.
///
/// ```text
///   Connected ──(create/join)──→ InRoom(code)
///       ↑                            │
///       └──(leave / room closed)─────┘
/// ```
///
/// A connection is in at most one room at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake done, not in any room.
    Connected,

    /// Member of the room with this code.
    InRoom(RoomCode),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single connection's session.
///
/// Created after the handshake, destroyed when the socket goes away.
/// There is no reconnection: a new socket is a new session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Connection this session belongs to.
    pub id: ConnectionId,

    /// Name shown to other members. Replaced by `player:joinRoom`.
    pub display_name: String,

    /// Lobby or room.
    pub state: SessionState,
}

impl Session {
    /// Creates a fresh session in the lobby.
    pub fn new(id: ConnectionId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            state: SessionState::Connected,
        }
    }

    /// The room this session is in, if any.
    pub fn current_room(&self) -> Option<&RoomCode> {
        match &self.state {
            SessionState::InRoom(code) => Some(code),
            SessionState::Connected => None,
        }
    }
}
