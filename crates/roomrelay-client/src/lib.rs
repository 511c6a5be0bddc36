//! Client session adapter for roomrelay.
//!
//! [`LobbyClient`] wraps one WebSocket connection to a relay and keeps the
//! client-side view of it: which room we're in, who else is there, and
//! what metadata everyone has shared.
//!
//! - Connection attempts back off exponentially ([`ReconnectPolicy`]) and
//!   concurrent callers share a single attempt.
//! - Room commands wait for the server's ack and fail with
//!   [`ClientError::Room`] carrying the server's [`ErrorCode`].
//! - Metadata set with [`LobbyClient::set_local_metadata`] is shared with
//!   the room and re-shared whenever the member list changes.
//! - Everything the server pushes is forwarded as a [`ClientEvent`].
//!
//! [`ErrorCode`]: roomrelay_protocol::ErrorCode

mod client;
mod config;
mod error;
mod event;

pub use client::{LobbyClient, METADATA_EVENT, RoomView};
pub use config::{ClientConfig, ReconnectPolicy};
pub use error::ClientError;
pub use event::ClientEvent;
