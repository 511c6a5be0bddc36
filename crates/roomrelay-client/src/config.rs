//! Client configuration.

use std::time::Duration;

/// How the client retries a failed or dropped connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries after the first failed attempt. `0` means try once.
    pub max_retries: u32,
    /// Wait before the first retry. Doubles on every retry.
    pub initial_delay: Duration,
    /// Upper bound for the wait between retries.
    pub max_delay: Duration,
    /// Reconnect by itself after an unexpected drop.
    pub auto_reconnect: bool,
}

impl ReconnectPolicy {
    /// One attempt, no automatic reconnect.
    pub fn never() -> Self {
        Self {
            max_retries: 0,
            auto_reconnect: false,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            auto_reconnect: true,
        }
    }
}

/// Configuration for a [`LobbyClient`](crate::LobbyClient).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use roomrelay_client::{ClientConfig, ReconnectPolicy};
///
/// let config = ClientConfig::new("ws://127.0.0.1:4000")
///     .with_name("Ada")
///     .with_reconnect(ReconnectPolicy::never())
///     .with_ack_timeout(Duration::from_secs(2));
/// assert_eq!(config.name.as_deref(), Some("Ada"));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `ws://` or `wss://` URL of the relay.
    pub url: String,
    /// Display name sent in the handshake. The server picks a placeholder
    /// when this is `None`.
    pub name: Option<String>,
    pub reconnect: ReconnectPolicy,
    /// How long to wait for `session:ready` and for command acks.
    pub ack_timeout: Duration,
    /// Buffer size of the event broadcast channel. Slow subscribers that
    /// fall further behind than this miss events.
    pub event_capacity: usize,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            reconnect: ReconnectPolicy::default(),
            ack_timeout: Duration::from_secs(5),
            event_capacity: 64,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
