//! # roomrelay
//!
//! A room-code lobby relay for small-party browser games.
//!
//! One player creates a room and gets a short code like `XK7P`; friends
//! join with the code; anything one member broadcasts is relayed to the
//! others. The relay never looks at game payloads and keeps nothing on
//! disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomrelay::prelude::*;
//!
//! # async fn start() -> Result<(), RelayError> {
//! let config = ServerConfig::from_env();
//! let server = RelayServerBuilder::from_config(&config)
//!     .build(DisplayNameAuthenticator)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod health;
mod lobby;
mod server;

pub use config::ServerConfig;
pub use error::RelayError;
pub use health::{HEALTH_PATH, HealthReport, cors_layer, health_routes};
pub use lobby::Lobby;
pub use server::{RelayServer, RelayServerBuilder};

/// Convenient re-exports for building a server.
pub mod prelude {
    pub use crate::{
        HealthReport, Lobby, RelayError, RelayServer, RelayServerBuilder,
        ServerConfig,
    };
    pub use roomrelay_protocol::{
        ClientFrame, ConnectionId, ErrorCode, MemberRecord, PROTOCOL_VERSION,
        RelayedEvent, RoomAck, RoomCode, ServerEvent, ServerFrame,
    };
    pub use roomrelay_room::RoomConfig;
    pub use roomrelay_session::{
        Authenticator, DisplayNameAuthenticator, SessionError,
    };
    pub use roomrelay_transport::OriginPolicy;
}
