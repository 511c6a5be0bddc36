//! The session manager: tracks every live connection's session.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself. It's a plain `HashMap`
//! owned by the lobby, which sits behind a single mutex in the server
//! state. Keeping it lock-free here avoids hidden locking overhead.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use roomrelay_protocol::{ConnectionId, RoomCode};

use crate::{Session, SessionError, SessionState};

/// Registry of sessions, keyed by connection id.
///
/// ## Lifecycle
///
/// ```text
/// handshake ──→ create() ──→ bind_room() / unbind_room() ──→ disconnect()
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session for a connection that just completed its
    /// handshake.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the id is taken.
    pub fn create(
        &mut self,
        id: ConnectionId,
        display_name: impl Into<String>,
    ) -> Result<&Session, SessionError> {
        match self.sessions.entry(id) {
            Entry::Occupied(_) => Err(SessionError::AlreadyConnected(id)),
            Entry::Vacant(slot) => {
                let session = slot.insert(Session::new(id, display_name));
                tracing::info!(
                    %id,
                    name = %session.display_name,
                    "session created"
                );
                Ok(session)
            }
        }
    }

    /// Looks up a session.
    pub fn get(&self, id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Replaces a session's display name.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn set_display_name(
        &mut self,
        id: ConnectionId,
        name: impl Into<String>,
    ) -> Result<(), SessionError> {
        let session = self.get_mut(id)?;
        session.display_name = name.into();
        Ok(())
    }

    /// Records that the connection is now in `code`.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn bind_room(
        &mut self,
        id: ConnectionId,
        code: RoomCode,
    ) -> Result<(), SessionError> {
        let session = self.get_mut(id)?;
        session.state = SessionState::InRoom(code);
        Ok(())
    }

    /// Moves the connection back to the lobby. Returns the room it left.
    ///
    /// Unknown ids are ignored: teardown may already have removed them.
    pub fn unbind_room(&mut self, id: ConnectionId) -> Option<RoomCode> {
        let session = self.sessions.get_mut(&id)?;
        match std::mem::replace(&mut session.state, SessionState::Connected) {
            SessionState::InRoom(code) => Some(code),
            SessionState::Connected => None,
        }
    }

    /// Removes the session for a closed connection and returns it.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if it was already removed.
    pub fn disconnect(
        &mut self,
        id: ConnectionId,
    ) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        tracing::info!(%id, "session removed");
        Ok(session)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get_mut(&mut self, id: ConnectionId) -> Result<&mut Session, SessionError> {
        self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))
    }
}

// =========================================================================
// Tests
// =========================================================================
