//! Rooms for roomrelay.
//!
//! A room is a short-lived group of connections addressed by a 4-character
//! code. All room state is plain data owned by the lobby; nothing in this
//! crate spawns tasks or takes locks.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates/destroys rooms, tracks memberships
//! - [`Room`]: one room's code, host, and members
//! - [`EventRelay`]: delivers outbound frames to connections
//! - [`RoomConfig`]: member cap and code-generation limits
//! - [`generate_code`]: collision-checked random codes

mod code;
mod config;
mod error;
mod registry;
mod relay;
mod room;

pub use code::{ALPHABET, CODE_LENGTH, generate_code, random_code};
pub use config::{DEFAULT_MAX_CODE_ATTEMPTS, DEFAULT_MAX_ROOM_SIZE, RoomConfig};
pub use error::RoomError;
pub use registry::{Departure, Joined, RoomRegistry, RoomSnapshot};
pub use relay::{EventRelay, OutboundSender, Recipient};
pub use room::{Member, Room};
