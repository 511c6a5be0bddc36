//! Error types for the room layer.

use roomrelay_protocol::{ErrorCode, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// `create_room` asked for a code that is already active.
    #[error("room {0} already exists")]
    RoomExists(RoomCode),

    /// No active room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room is at capacity.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// Code generation gave up after this many collisions.
    #[error("no free room code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
}

impl RoomError {
    /// The code reported to the client in a failed ack.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::RoomExists(_) => ErrorCode::RoomExists,
            Self::NotFound(_) => ErrorCode::RoomNotFound,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::CodeSpaceExhausted { .. } => ErrorCode::Internal,
        }
    }
}
