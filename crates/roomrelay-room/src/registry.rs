//! Room registry: every active room, and which room each connection is in.

use std::collections::HashMap;

use roomrelay_protocol::{ConnectionId, MemberRecord, RoomCode};

use crate::code::generate_code;
use crate::{Room, RoomConfig, RoomError};

/// A room's code and roster at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub members: Vec<MemberRecord>,
}

/// Result of a successful create or join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    /// The room the connection is now in.
    pub room: RoomSnapshot,
    /// The room it had to leave to get there, if any.
    pub left: Option<Departure>,
}

/// What happened to a room when a connection left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The room that was left.
    pub code: RoomCode,
    /// Whether the leaver was the host.
    pub was_host: bool,
    /// `true` if the room no longer exists.
    pub room_closed: bool,
    /// Who should hear about it: the other members, in join order. When
    /// the room closed these are its former members, already evicted.
    pub remaining: Vec<ConnectionId>,
    /// Roster after the departure. Empty when the room closed.
    pub members: Vec<MemberRecord>,
}

/// Manages all active rooms and tracks which connection is in which room.
///
/// Invariants kept by every method:
/// - codes are unique among active rooms and stored upper-case
/// - a connection is in at most ONE room
/// - `memberships` and the rooms' member lists agree
/// - no room outlives its host, and no room is ever empty
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    memberships: HashMap<ConnectionId, RoomCode>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with `host` as its only member.
    ///
    /// `requested` is used as the code when present and non-blank
    /// (any case); otherwise a fresh code is generated. If `host` is in
    /// another room it leaves that room, but only once the new room is
    /// certain to be created.
    ///
    /// # Errors
    /// - [`RoomError::RoomExists`]: the requested code is active
    /// - [`RoomError::CodeSpaceExhausted`]: no free code was found
    pub fn create_room(
        &mut self,
        requested: Option<&str>,
        host: ConnectionId,
        host_name: &str,
    ) -> Result<Joined, RoomError> {
        let code = match requested.and_then(RoomCode::normalize) {
            Some(code) if self.rooms.contains_key(&code) => {
                return Err(RoomError::RoomExists(code));
            }
            Some(code) => code,
            None => generate_code(
                &mut rand::rng(),
                |candidate| self.rooms.contains_key(candidate),
                self.config.max_code_attempts,
            )?,
        };

        let left = self.remove_connection(host);

        let room = Room::new(code.clone(), host, host_name);
        let snapshot = RoomSnapshot {
            code: code.clone(),
            members: room.member_records(),
        };
        self.rooms.insert(code.clone(), room);
        self.memberships.insert(host, code.clone());

        tracing::info!(room = %code, %host, "room created");
        Ok(Joined {
            room: snapshot,
            left,
        })
    }

    /// Adds a connection to an existing room.
    ///
    /// Joining the room you're already in just updates your name. Joining
    /// a different room leaves the current one first.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no active room has this code
    /// - [`RoomError::RoomFull`]: the room is at `max_room_size`
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        id: ConnectionId,
        display_name: &str,
    ) -> Result<Joined, RoomError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let rejoin = room.contains(id);
        if !rejoin && room.len() >= self.config.max_room_size {
            return Err(RoomError::RoomFull(code.clone()));
        }

        let left = if rejoin {
            None
        } else {
            self.remove_connection(id)
        };

        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        room.upsert(id, display_name);
        self.memberships.insert(id, code.clone());

        let snapshot = RoomSnapshot {
            code: code.clone(),
            members: room.member_records(),
        };
        tracing::info!(
            room = %code,
            %id,
            members = snapshot.members.len(),
            "joined room"
        );
        Ok(Joined {
            room: snapshot,
            left,
        })
    }

    /// Takes a connection out of whatever room it's in.
    ///
    /// If it was the host (or the last member), the room is destroyed and
    /// every other member is evicted with it. Returns `None` when the
    /// connection wasn't in a room, so calling this twice is harmless.
    pub fn remove_connection(
        &mut self,
        id: ConnectionId,
    ) -> Option<Departure> {
        let code = self.memberships.remove(&id)?;
        let Some(room) = self.rooms.get_mut(&code) else {
            tracing::warn!(room = %code, %id, "membership pointed at missing room");
            return None;
        };

        room.remove(id);
        let was_host = room.is_host(id);

        if was_host || room.is_empty() {
            let remaining = self
                .rooms
                .remove(&code)
                .map(|room| room.member_ids())
                .unwrap_or_default();
            for member in &remaining {
                self.memberships.remove(member);
            }
            tracing::info!(
                room = %code,
                %id,
                evicted = remaining.len(),
                "room closed"
            );
            return Some(Departure {
                code,
                was_host,
                room_closed: true,
                remaining,
                members: Vec::new(),
            });
        }

        tracing::info!(room = %code, %id, "left room");
        Some(Departure {
            code,
            was_host,
            room_closed: false,
            remaining: room.member_ids(),
            members: room.member_records(),
        })
    }

    /// Current roster of a room, empty if the room doesn't exist.
    pub fn list_members(&self, code: &RoomCode) -> Vec<MemberRecord> {
        self.rooms
            .get(code)
            .map(Room::member_records)
            .unwrap_or_default()
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// The room a connection is in, if any.
    pub fn room_of(&self, id: ConnectionId) -> Option<&RoomCode> {
        self.memberships.get(&id)
    }

    /// Returns `true` if `id` is a member of `code`.
    pub fn is_member(&self, code: &RoomCode, id: ConnectionId) -> bool {
        self.memberships.get(&id) == Some(code)
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all active room codes.
    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }
}
