//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Default member cap per room.
pub const DEFAULT_MAX_ROOM_SIZE: usize = 6;

/// Default number of random draws before code generation gives up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 1000;

/// Configuration for a [`RoomRegistry`](crate::RoomRegistry).
///
/// Fixed for the registry's lifetime. Changing the cap means a restart,
/// so rooms never end up over a limit that shrank under them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum members per room, host included. Clamped to at least 1.
    pub max_room_size: usize,

    /// Collision retries allowed when generating a code.
    pub max_code_attempts: u32,
}

impl RoomConfig {
    /// Default config with a different member cap.
    pub fn with_max_room_size(max_room_size: usize) -> Self {
        Self {
            max_room_size: max_room_size.max(1),
            ..Self::default()
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_room_size, 6);
        assert_eq!(config.max_code_attempts, 1000);
    }

    #[test]
    fn test_with_max_room_size_clamps_zero() {
        assert_eq!(RoomConfig::with_max_room_size(0).max_room_size, 1);
        assert_eq!(RoomConfig::with_max_room_size(10).max_room_size, 10);
    }
}
