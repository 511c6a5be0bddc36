//! Handshake hook that turns a requested display name into the name the
//! connection will be known by.
//!
//! roomrelay has no accounts: identity is just a display name. The
//! [`Authenticator`] trait still exists as a seam so a deployment can plug
//! in a profanity filter, a reserved-name list, or a real identity check
//! without touching the handler.

use rand::Rng;

use crate::SessionError;

/// Longest display name kept after trimming, in characters.
pub const MAX_NAME_CHARS: usize = 32;

const PLACEHOLDER_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Resolves the display name for a new connection.
///
/// `Send + Sync + 'static` because the authenticator lives in the shared
/// server state for the server's whole lifetime.
///
/// # Example
///
/// ```rust
/// use roomrelay_session::{Authenticator, SessionError};
///
/// /// Refuses anyone who doesn't pick a name.
/// struct NamedOnly;
///
/// impl Authenticator for NamedOnly {
///     async fn authenticate(
///         &self,
///         requested_name: Option<&str>,
///     ) -> Result<String, SessionError> {
///         match requested_name.map(str::trim) {
///             Some(name) if !name.is_empty() => Ok(name.to_string()),
///             _ => Err(SessionError::Rejected("a name is required".into())),
///         }
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Returns the display name to use, or refuses the connection.
    ///
    /// Called once per connection, with the `name` from the handshake.
    fn authenticate(
        &self,
        requested_name: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, SessionError>> + Send;
}

/// Accepts everyone. Trims the requested name, caps its length, and hands
/// out a `Player-xxxx` placeholder when nothing usable was sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayNameAuthenticator;

impl Authenticator for DisplayNameAuthenticator {
    async fn authenticate(
        &self,
        requested_name: Option<&str>,
    ) -> Result<String, SessionError> {
        Ok(clean_display_name(requested_name)
            .unwrap_or_else(placeholder_name))
    }
}

/// Trims and truncates a client-supplied name.
///
/// Returns `None` when the result would be empty.
pub fn clean_display_name(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NAME_CHARS).collect())
}

/// A fresh `Player-` name with four random lowercase alphanumerics.
pub fn placeholder_name() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..4)
        .map(|_| {
            let idx = rng.random_range(0..PLACEHOLDER_CHARS.len());
            char::from(PLACEHOLDER_CHARS[idx])
        })
        .collect();
    format!("Player-{suffix}")
}
