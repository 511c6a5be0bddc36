//! Connection sessions for roomrelay.
//!
//! This crate handles the server-side view of a single connection:
//!
//! 1. **Naming**: resolving the display name at handshake ([`Authenticator`])
//! 2. **Session tracking**: who's connected and which room they're in
//!    ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby (above)   ← binds sessions to rooms, reads display names
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol Layer (below)  ← provides ConnectionId, RoomCode
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;

pub use auth::{
    Authenticator, DisplayNameAuthenticator, MAX_NAME_CHARS,
    clean_display_name, placeholder_name,
};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
