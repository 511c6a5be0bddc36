//! Frames: the top-level JSON objects exchanged over a lobby connection.
//!
//! ```text
//! client → server   {"event": "player:joinRoom", "data": {...}, "ack": 7}
//! server → client   {"ack": 7, "data": {"ok": true, ...}}
//! server → client   {"event": "room:players", "data": [...]}
//! ```
//!
//! Client frames are decoded in two steps. First into a loose
//! [`ClientFrame`] (so a bad payload still yields the `ack` id we must
//! answer), then into a typed [`ClientCommand`] via [`ClientFrame::command`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{MemberRecord, RelayedEvent, RoomAck, SessionInfo};
use crate::ProtocolError;

/// Current protocol version. Clients send it in their handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Event names as they appear on the wire.
pub mod events {
    /// Client → Server, first frame of every connection.
    pub const HANDSHAKE: &str = "handshake";
    /// Client → Server, acked.
    pub const CREATE_ROOM: &str = "host:createRoom";
    /// Client → Server, acked.
    pub const JOIN_ROOM: &str = "player:joinRoom";
    /// Client → Server, fire-and-forget.
    pub const BROADCAST: &str = "room:broadcast";
    /// Client → Server, fire-and-forget.
    pub const LEAVE_ROOM: &str = "room:leave";
    /// Server → Client after a successful handshake.
    pub const SESSION_READY: &str = "session:ready";
    /// Server → Client when the handshake is refused.
    pub const CONNECT_ERROR: &str = "connect_error";
    /// Server → Client on every membership change.
    pub const PLAYERS: &str = "room:players";
    /// Server → Client, a relayed broadcast.
    pub const EVENT: &str = "room:event";
    /// Server → Client, the host left and the room is gone.
    pub const CLOSED: &str = "room:closed";
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// A raw client frame before its payload has been interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Event name, see [`events`].
    pub event: String,
    /// Event payload. Missing and `null` are treated the same.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    /// Acknowledgement id the server must echo back, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

/// First frame of a connection.
///
/// Missing fields take their defaults, so `{"event":"handshake"}` is a
/// current-version handshake without a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Handshake {
    /// Must equal [`PROTOCOL_VERSION`].
    pub version: u32,
    /// Requested display name. A placeholder is assigned when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            name: None,
        }
    }
}

/// Payload of `host:createRoom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Explicit code to use instead of a generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
}

/// Payload of `player:joinRoom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    /// Code of the room to join, any case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    /// New display name for this connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload of `room:broadcast`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    /// Target room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    /// Application event type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Opaque payload relayed as-is.
    #[serde(default)]
    pub payload: Value,
}

/// A decoded client command.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `handshake`
    Handshake(Handshake),
    /// `host:createRoom`
    CreateRoom(CreateRoomRequest),
    /// `player:joinRoom`
    JoinRoom(JoinRoomRequest),
    /// `room:broadcast`
    Broadcast(BroadcastRequest),
    /// `room:leave`
    LeaveRoom,
}

impl ClientCommand {
    /// The wire event name of this command.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Handshake(_) => events::HANDSHAKE,
            Self::CreateRoom(_) => events::CREATE_ROOM,
            Self::JoinRoom(_) => events::JOIN_ROOM,
            Self::Broadcast(_) => events::BROADCAST,
            Self::LeaveRoom => events::LEAVE_ROOM,
        }
    }
}

impl ClientFrame {
    /// Wraps a command for sending, with an optional ack id.
    pub fn from_command(
        command: &ClientCommand,
        ack: Option<u64>,
    ) -> Result<Self, ProtocolError> {
        let data = match command {
            ClientCommand::Handshake(h) => serde_json::to_value(h),
            ClientCommand::CreateRoom(r) => serde_json::to_value(r),
            ClientCommand::JoinRoom(r) => serde_json::to_value(r),
            ClientCommand::Broadcast(r) => serde_json::to_value(r),
            ClientCommand::LeaveRoom => Ok(Value::Null),
        }
        .map_err(ProtocolError::Encode)?;
        Ok(Self {
            event: command.event_name().to_string(),
            data,
            ack,
        })
    }

    /// Interprets the payload according to the event name.
    ///
    /// # Errors
    /// - [`ProtocolError::UnknownEvent`] for an event this protocol lacks
    /// - [`ProtocolError::Decode`] when the payload has the wrong shape
    pub fn command(&self) -> Result<ClientCommand, ProtocolError> {
        match self.event.as_str() {
            events::HANDSHAKE => {
                payload_or_default(&self.data).map(ClientCommand::Handshake)
            }
            events::CREATE_ROOM => {
                payload_or_default(&self.data).map(ClientCommand::CreateRoom)
            }
            events::JOIN_ROOM => {
                payload_or_default(&self.data).map(ClientCommand::JoinRoom)
            }
            events::BROADCAST => {
                payload_or_default(&self.data).map(ClientCommand::Broadcast)
            }
            events::LEAVE_ROOM => Ok(ClientCommand::LeaveRoom),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// Decodes `data`, treating a missing payload as the default request.
fn payload_or_default<T>(data: &Value) -> Result<T, ProtocolError>
where
    T: Default + serde::de::DeserializeOwned,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data.clone()).map_err(ProtocolError::Decode)
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Connect-error body, sent before the server closes a refused connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectErrorInfo {
    /// Human-readable reason.
    pub message: String,
}

/// A named event pushed by the server.
///
/// Adjacently tagged, so `Closed` goes out as `{"event":"room:closed"}`
/// with no `data` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Handshake accepted.
    #[serde(rename = "session:ready")]
    SessionReady(SessionInfo),
    /// Handshake refused; the connection closes next.
    #[serde(rename = "connect_error")]
    ConnectError(ConnectErrorInfo),
    /// Fresh member list of the room you're in.
    #[serde(rename = "room:players")]
    Players(Vec<MemberRecord>),
    /// Broadcast from another member.
    #[serde(rename = "room:event")]
    Event(RelayedEvent),
    /// The host left; the room no longer exists.
    #[serde(rename = "room:closed")]
    Closed,
}

/// Anything the server writes to a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// Reply to a client frame that carried an `ack` id.
    Ack {
        /// The id from the client frame.
        ack: u64,
        /// Ack body.
        data: RoomAck,
    },
    /// A pushed event.
    Push(ServerEvent),
}

impl From<ServerEvent> for ServerFrame {
    fn from(event: ServerEvent) -> Self {
        Self::Push(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConnectionId, ErrorCode, RoomCode};
    use serde_json::json;

    fn frame(value: Value) -> ClientFrame {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_create_room_without_data_is_default_request() {
        let f = frame(json!({"event": "host:createRoom", "ack": 1}));
        assert_eq!(
            f.command().unwrap(),
            ClientCommand::CreateRoom(CreateRoomRequest::default())
        );
    }

    #[test]
    fn test_join_room_reads_camel_case_fields() {
        let f = frame(json!({
            "event": "player:joinRoom",
            "data": {"roomCode": "ab12", "name": "Bo"},
            "ack": 2
        }));
        match f.command().unwrap() {
            ClientCommand::JoinRoom(req) => {
                assert_eq!(req.room_code.as_deref(), Some("ab12"));
                assert_eq!(req.name.as_deref(), Some("Bo"));
            }
            other => panic!("expected JoinRoom, got {other:?}"),
        }
    }

    #[test]
    fn test_broadcast_reads_type_and_payload() {
        let f = frame(json!({
            "event": "room:broadcast",
            "data": {"roomCode": "AB12", "type": "ping", "payload": {"n": 1}}
        }));
        match f.command().unwrap() {
            ClientCommand::Broadcast(req) => {
                assert_eq!(req.kind.as_deref(), Some("ping"));
                assert_eq!(req.payload, json!({"n": 1}));
                assert!(f.ack.is_none());
            }
            other => panic!("expected Broadcast, got {other:?}"),
        }
    }

    #[test]
    fn test_broadcast_missing_type_still_decodes() {
        // Missing fields are a no-op for the handler, not a decode error.
        let f = frame(json!({"event": "room:broadcast", "data": {}}));
        match f.command().unwrap() {
            ClientCommand::Broadcast(req) => {
                assert!(req.kind.is_none());
                assert!(req.room_code.is_none());
            }
            other => panic!("expected Broadcast, got {other:?}"),
        }
    }

    #[test]
    fn test_handshake_without_version_is_current() {
        let f = frame(json!({"event": "handshake", "data": {"name": "x"}}));
        assert_eq!(
            f.command().unwrap(),
            ClientCommand::Handshake(Handshake {
                version: PROTOCOL_VERSION,
                name: Some("x".to_string()),
            })
        );
    }

    #[test]
    fn test_handshake_without_data_is_default() {
        let f = frame(json!({"event": "handshake"}));
        assert_eq!(
            f.command().unwrap(),
            ClientCommand::Handshake(Handshake::default())
        );
    }

    #[test]
    fn test_handshake_wrong_version_type_is_decode_error() {
        let f = frame(json!({"event": "handshake", "data": {"version": "one"}}));
        assert!(matches!(f.command(), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_unknown_event_is_reported() {
        let f = frame(json!({"event": "fly:toMoon"}));
        assert!(matches!(
            f.command(),
            Err(ProtocolError::UnknownEvent(name)) if name == "fly:toMoon"
        ));
    }

    #[test]
    fn test_wrong_payload_type_is_decode_error() {
        let f = frame(json!({
            "event": "player:joinRoom",
            "data": {"roomCode": 1234}
        }));
        assert!(matches!(f.command(), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_from_command_leave_room_has_no_data() {
        let f = ClientFrame::from_command(&ClientCommand::LeaveRoom, None)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&f).unwrap(),
            json!({"event": "room:leave"})
        );
    }

    #[test]
    fn test_from_command_then_command_is_identity() {
        let cmd = ClientCommand::JoinRoom(JoinRoomRequest {
            room_code: Some("QW34".into()),
            name: None,
        });
        let f = ClientFrame::from_command(&cmd, Some(5)).unwrap();
        assert_eq!(f.ack, Some(5));
        assert_eq!(f.command().unwrap(), cmd);
    }

    #[test]
    fn test_room_closed_has_no_data_field() {
        let value =
            serde_json::to_value(ServerFrame::Push(ServerEvent::Closed))
                .unwrap();
        assert_eq!(value, json!({"event": "room:closed"}));
    }

    #[test]
    fn test_players_event_json_shape() {
        let frame = ServerFrame::from(ServerEvent::Players(vec![MemberRecord {
            id: ConnectionId::new(4),
            name: "Kim".into(),
            is_host: false,
        }]));
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({
                "event": "room:players",
                "data": [{"id": 4, "name": "Kim", "isHost": false}]
            })
        );
    }

    #[test]
    fn test_ack_frame_json_shape() {
        let frame = ServerFrame::Ack {
            ack: 11,
            data: RoomAck::failure(ErrorCode::RoomExists),
        };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"ack": 11, "data": {"ok": false, "error": "ROOM_EXISTS"}})
        );
    }

    #[test]
    fn test_server_frame_decodes_ack_and_push() {
        let ack: ServerFrame = serde_json::from_value(json!({
            "ack": 2,
            "data": {"ok": true, "roomCode": "AB12", "players": []}
        }))
        .unwrap();
        assert_eq!(
            ack,
            ServerFrame::Ack {
                ack: 2,
                data: RoomAck::success(
                    RoomCode::normalize("AB12").unwrap(),
                    vec![]
                ),
            }
        );

        let closed: ServerFrame =
            serde_json::from_value(json!({"event": "room:closed"})).unwrap();
        assert_eq!(closed, ServerFrame::Push(ServerEvent::Closed));
    }

    #[test]
    fn test_session_ready_decodes() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "event": "session:ready",
            "data": {"id": 17, "name": "Player-ab3x"}
        }))
        .unwrap();
        match frame {
            ServerFrame::Push(ServerEvent::SessionReady(info)) => {
                assert_eq!(info.id, ConnectionId::new(17));
                assert_eq!(info.name, "Player-ab3x");
            }
            other => panic!("expected SessionReady, got {other:?}"),
        }
    }
}
