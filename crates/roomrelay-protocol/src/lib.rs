//! Wire protocol for roomrelay.
//!
//! This crate defines the "language" lobby clients and the relay speak:
//!
//! - **Frames** ([`ClientFrame`], [`ClientCommand`], [`ServerFrame`],
//!   [`ServerEvent`]): the JSON objects that travel on the wire.
//! - **Values** ([`RoomCode`], [`MemberRecord`], [`RoomAck`],
//!   [`ErrorCode`]): what those frames carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing that.
//!
//! The protocol layer knows nothing about sockets or rooms:
//!
//! ```text
//! Transport (bytes) → Protocol (frames) → Lobby (rooms, sessions)
//! ```

mod codec;
mod error;
mod frames;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use frames::{
    BroadcastRequest, ClientCommand, ClientFrame, ConnectErrorInfo,
    CreateRoomRequest, Handshake, JoinRoomRequest, PROTOCOL_VERSION,
    ServerEvent, ServerFrame, events,
};
pub use types::{
    ConnectionId, ErrorCode, MemberRecord, RelayedEvent, RoomAck, RoomCode,
    SessionInfo,
};
