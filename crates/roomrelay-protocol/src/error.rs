//! Error types for the protocol layer.
//!
//! Each crate in roomrelay defines its own error enum. A `ProtocolError`
//! always means a frame could not be turned into (or out of) bytes, never
//! that a room operation failed: those travel back to clients as
//! [`ErrorCode`](crate::ErrorCode)s inside an acknowledgement.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// field with the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame names an event this protocol doesn't define.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The message is invalid at the protocol level.
    ///
    /// For frames that parse but break protocol rules, e.g. a handshake
    /// that doesn't come first.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
