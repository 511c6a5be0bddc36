//! Server configuration, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | interface to listen on |
//! | `PORT` | `4000` | WebSocket and `/health` port |
//! | `CLIENT_ORIGIN` | `*` | allowed browser origins, comma-separated |
//! | `MAX_ROOM_SIZE` | `6` | members per room, host included |
//! | `HANDSHAKE_TIMEOUT_SECS` | `5` | time allowed for the first frame |

use std::str::FromStr;
use std::time::Duration;

use roomrelay_room::DEFAULT_MAX_ROOM_SIZE;
use roomrelay_transport::OriginPolicy;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

/// Everything the `roomrelay` binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub client_origin: OriginPolicy,
    pub max_room_size: usize,
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            client_origin: OriginPolicy::Any,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            handshake_timeout: Duration::from_secs(
                DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            ),
        }
    }
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Unset variables keep their default. Values that fail to parse also
    /// keep the default, with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            let host = host.trim();
            if !host.is_empty() {
                config.host = host.to_string();
            }
        }

        parse_into(&lookup, "PORT", &mut config.port);

        if let Some(origin) = lookup("CLIENT_ORIGIN") {
            config.client_origin = OriginPolicy::parse(&origin);
        }

        parse_into(&lookup, "MAX_ROOM_SIZE", &mut config.max_room_size);
        if config.max_room_size == 0 {
            tracing::warn!("MAX_ROOM_SIZE must be at least 1, using default");
            config.max_room_size = DEFAULT_MAX_ROOM_SIZE;
        }

        let mut secs = DEFAULT_HANDSHAKE_TIMEOUT_SECS;
        parse_into(&lookup, "HANDSHAKE_TIMEOUT_SECS", &mut secs);
        config.handshake_timeout = Duration::from_secs(secs.max(1));

        config
    }

    /// `host:port` of the listener.
    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_into<T, F>(lookup: &F, key: &str, slot: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(key, value = %raw, "invalid value, using default"),
    }
}
