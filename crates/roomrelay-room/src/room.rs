//! A single room: its code, its host, and who's in it.

use roomrelay_protocol::{ConnectionId, MemberRecord, RoomCode};

/// One member of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: ConnectionId,
    pub name: String,
}

/// A live room.
///
/// Members are kept in join order so the roster clients see is stable
/// between updates. The host is always a member; when the host leaves the
/// room is torn down by the registry instead of getting a new host.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    host: ConnectionId,
    members: Vec<Member>,
}

impl Room {
    /// Creates a room with `host` as its only member.
    pub fn new(
        code: RoomCode,
        host: ConnectionId,
        host_name: impl Into<String>,
    ) -> Self {
        Self {
            code,
            host,
            members: vec![Member {
                id: host,
                name: host_name.into(),
            }],
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host(&self) -> ConnectionId {
        self.host
    }

    pub fn is_host(&self, id: ConnectionId) -> bool {
        self.host == id
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Ids of every member, in join order.
    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.id).collect()
    }

    /// Adds a member, or renames them if they're already here.
    ///
    /// Capacity is the registry's concern, not checked here.
    pub(crate) fn upsert(&mut self, id: ConnectionId, name: impl Into<String>) {
        let name = name.into();
        match self.members.iter_mut().find(|m| m.id == id) {
            Some(member) => member.name = name,
            None => self.members.push(Member { id, name }),
        }
    }

    /// Removes a member. Returns `false` if they weren't here.
    pub(crate) fn remove(&mut self, id: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        self.members.len() != before
    }

    /// The roster as sent to clients, computed fresh every call.
    pub fn member_records(&self) -> Vec<MemberRecord> {
        self.members
            .iter()
            .map(|m| MemberRecord {
                id: m.id,
                name: m.name.clone(),
                is_host: m.id == self.host,
            })
            .collect()
    }
}
