//! Value types carried inside lobby frames.
//!
//! Field names follow the camelCase shapes that browser clients already
//! speak (`roomCode`, `isHost`), which is why most structs here carry
//! `#[serde(rename_all = "camelCase")]`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use roomrelay_transport::ConnectionId;

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// A short, human-typeable room identifier such as `"AB12"`.
///
/// Codes are always stored upper-case. Build one with
/// [`RoomCode::normalize`] so that `"ab12"` and `"AB12"` name the same room.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Trims and upper-cases a client-supplied code.
    ///
    /// Returns `None` for an empty or all-whitespace input.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Membership view
// ---------------------------------------------------------------------------

/// One entry of the member list pushed in `room:players` and acks.
///
/// Derived from the registry on every membership change, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    /// The member's connection id.
    pub id: ConnectionId,
    /// Display name at the time the list was built.
    pub name: String,
    /// `true` for exactly one member: the room's creator.
    pub is_host: bool,
}

/// Sent once after a successful handshake: who the server thinks you are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Connection id assigned by the transport.
    pub id: ConnectionId,
    /// Display name resolved from the handshake.
    pub name: String,
}

/// A broadcast relayed to the other members of a room.
///
/// `payload` is opaque: the relay never looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayedEvent {
    /// Sender's connection id.
    pub from: ConnectionId,
    /// Application-defined event type, e.g. `"player:metadata"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Application-defined payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Server wall-clock time in milliseconds since the Unix epoch.
    pub ts: u64,
}

// ---------------------------------------------------------------------------
// Errors and acknowledgements
// ---------------------------------------------------------------------------

/// Failure codes returned in acknowledgements.
///
/// The four `Room*` codes are the whole room-level taxonomy; `Internal` is
/// the generic answer for malformed requests and unexpected server faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// `host:createRoom` asked for a code that is already active.
    #[serde(rename = "ROOM_EXISTS")]
    RoomExists,
    /// `player:joinRoom` without a room code.
    #[serde(rename = "ROOM_REQUIRED")]
    RoomRequired,
    /// No active room has that code.
    #[serde(rename = "ROOM_NOT_FOUND")]
    RoomNotFound,
    /// The room is at capacity.
    #[serde(rename = "ROOM_FULL")]
    RoomFull,
    /// Anything else went wrong.
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    /// The wire spelling of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomExists => "ROOM_EXISTS",
            Self::RoomRequired => "ROOM_REQUIRED",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomFull => "ROOM_FULL",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement body for `host:createRoom` and `player:joinRoom`.
///
/// Serializes as `{ok:true, roomCode, players}` or `{ok:false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAck {
    /// Whether the command succeeded.
    pub ok: bool,
    /// The (normalized) code of the room the caller is now in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<RoomCode>,
    /// Fresh member list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<MemberRecord>>,
    /// Failure reason when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl RoomAck {
    /// A successful acknowledgement.
    pub fn success(room_code: RoomCode, players: Vec<MemberRecord>) -> Self {
        Self {
            ok: true,
            room_code: Some(room_code),
            players: Some(players),
            error: None,
        }
    }

    /// A failed acknowledgement.
    pub fn failure(error: ErrorCode) -> Self {
        Self {
            ok: false,
            room_code: None,
            players: None,
            error: Some(error),
        }
    }

    /// Converts the ack into a `Result`.
    ///
    /// A malformed ack (`ok:true` without a code, or `ok:false` without an
    /// error) is reported as [`ErrorCode::Internal`].
    pub fn into_result(
        self,
    ) -> Result<(RoomCode, Vec<MemberRecord>), ErrorCode> {
        match (self.ok, self.room_code, self.error) {
            (true, Some(code), _) => Ok((code, self.players.unwrap_or_default())),
            (false, _, Some(error)) => Err(error),
            _ => Err(ErrorCode::Internal),
        }
    }
}
