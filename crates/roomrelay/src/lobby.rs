//! The lobby: sessions, rooms, and the relay, driven one command at a time.
//!
//! Every method here runs while the caller holds the server's lobby
//! mutex, so each command sees and leaves the registry in a consistent
//! state. Nothing in here awaits: outbound frames are pushed into
//! per-connection channels and written to sockets by each connection's
//! writer task.
//!
//! Ordering rules a client can rely on:
//! - `session:ready` is the first frame on every connection
//! - a command's ack arrives before any `room:players` it triggered
//! - frames to one connection arrive in the order they were produced

use std::time::{SystemTime, UNIX_EPOCH};

use roomrelay_protocol::{
    BroadcastRequest, ClientCommand, ClientFrame, ConnectionId,
    CreateRoomRequest, ErrorCode, JoinRoomRequest, RelayedEvent, RoomAck,
    RoomCode, ServerEvent, ServerFrame, SessionInfo,
};
use roomrelay_room::{
    Departure, EventRelay, Joined, OutboundSender, Recipient, RoomConfig,
    RoomRegistry,
};
use roomrelay_session::{SessionError, SessionManager, clean_display_name};

/// All mutable server state.
#[derive(Debug)]
pub struct Lobby {
    sessions: SessionManager,
    registry: RoomRegistry,
    relay: EventRelay<ServerFrame>,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

impl Lobby {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            sessions: SessionManager::new(),
            registry: RoomRegistry::new(config),
            relay: EventRelay::new(),
        }
    }

    /// Registers a connection that passed the handshake and queues its
    /// `session:ready` frame.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the id is already registered.
    pub fn connect(
        &mut self,
        id: ConnectionId,
        display_name: String,
        outbound: OutboundSender<ServerFrame>,
    ) -> Result<SessionInfo, SessionError> {
        let session = self.sessions.create(id, display_name)?;
        let info = SessionInfo {
            id,
            name: session.display_name.clone(),
        };
        self.relay.attach(id, outbound);
        self.relay
            .send_to(id, ServerEvent::SessionReady(info.clone()).into());
        Ok(info)
    }

    /// Dispatches one decoded client frame.
    pub fn handle(&mut self, id: ConnectionId, frame: ClientFrame) {
        let ack = frame.ack;
        match frame.command() {
            Ok(ClientCommand::CreateRoom(req)) => self.create_room(id, ack, req),
            Ok(ClientCommand::JoinRoom(req)) => self.join_room(id, ack, req),
            Ok(ClientCommand::Broadcast(req)) => self.broadcast(id, req),
            Ok(ClientCommand::LeaveRoom) => self.leave_room(id),
            Ok(ClientCommand::Handshake(_)) => {
                tracing::debug!(%id, "repeated handshake ignored");
                self.reply(id, ack, RoomAck::failure(ErrorCode::Internal));
            }
            Err(e) => {
                tracing::debug!(
                    %id,
                    event = %frame.event,
                    error = %e,
                    "bad command"
                );
                self.reply(id, ack, RoomAck::failure(ErrorCode::Internal));
            }
        }
    }

    /// `host:createRoom`
    pub fn create_room(
        &mut self,
        id: ConnectionId,
        ack: Option<u64>,
        req: CreateRoomRequest,
    ) {
        let Some(name) = self.display_name(id) else {
            self.reply(id, ack, RoomAck::failure(ErrorCode::Internal));
            return;
        };

        match self
            .registry
            .create_room(req.room_code.as_deref(), id, &name)
        {
            Ok(joined) => self.settle(id, ack, joined, false),
            Err(e) => {
                tracing::debug!(%id, error = %e, "create room refused");
                self.reply(id, ack, RoomAck::failure(e.error_code()));
            }
        }
    }

    /// `player:joinRoom`
    pub fn join_room(
        &mut self,
        id: ConnectionId,
        ack: Option<u64>,
        req: JoinRoomRequest,
    ) {
        let Some(code) = req.room_code.as_deref().and_then(RoomCode::normalize)
        else {
            self.reply(id, ack, RoomAck::failure(ErrorCode::RoomRequired));
            return;
        };
        let Some(current) = self.display_name(id) else {
            self.reply(id, ack, RoomAck::failure(ErrorCode::Internal));
            return;
        };
        let name = clean_display_name(req.name.as_deref()).unwrap_or(current);

        match self.registry.join_room(&code, id, &name) {
            Ok(joined) => {
                if let Err(e) = self.sessions.set_display_name(id, name) {
                    tracing::warn!(%id, error = %e, "joined without a session");
                }
                self.settle(id, ack, joined, true);
            }
            Err(e) => {
                tracing::debug!(%id, room = %code, error = %e, "join refused");
                self.reply(id, ack, RoomAck::failure(e.error_code()));
            }
        }
    }

    /// `room:broadcast`. Never acked; anything invalid is dropped.
    pub fn broadcast(&mut self, id: ConnectionId, req: BroadcastRequest) {
        let Some(code) = req.room_code.as_deref().and_then(RoomCode::normalize)
        else {
            tracing::debug!(%id, "broadcast without room code");
            return;
        };
        let Some(kind) = req.kind.filter(|k| !k.is_empty()) else {
            tracing::debug!(%id, "broadcast without type");
            return;
        };
        let Some(room) = self.registry.get(&code) else {
            tracing::debug!(%id, room = %code, "broadcast to missing room");
            return;
        };
        if !room.contains(id) {
            tracing::debug!(%id, room = %code, "broadcast from non-member");
            return;
        }

        let event = RelayedEvent {
            from: id,
            kind,
            payload: req.payload,
            ts: now_millis(),
        };
        self.relay.dispatch(
            &room.member_ids(),
            Recipient::AllExcept(id),
            ServerEvent::Event(event).into(),
        );
    }

    /// `room:leave`. Same teardown as a disconnect, but the connection
    /// stays open in the lobby.
    pub fn leave_room(&mut self, id: ConnectionId) {
        if let Some(departure) = self.registry.remove_connection(id) {
            self.sessions.unbind_room(id);
            self.announce_departure(departure);
        }
    }

    /// Tears down everything for a closed connection. Safe to call more
    /// than once.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.relay.detach(id);
        if let Err(e) = self.sessions.disconnect(id) {
            tracing::debug!(%id, error = %e, "disconnect without session");
        }
        if let Some(departure) = self.registry.remove_connection(id) {
            self.announce_departure(departure);
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }

    /// Read access to the room registry.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    // -- internals --------------------------------------------------------

    fn display_name(&self, id: ConnectionId) -> Option<String> {
        self.sessions.get(&id).map(|s| s.display_name.clone())
    }

    /// Finishes a successful create/join: clean up the room that was left,
    /// bind the session, ack, and optionally push the new roster.
    fn settle(
        &mut self,
        id: ConnectionId,
        ack: Option<u64>,
        joined: Joined,
        push_players: bool,
    ) {
        if let Some(departure) = joined.left {
            self.announce_departure(departure);
        }

        let code = joined.room.code;
        let members = joined.room.members;
        if let Err(e) = self.sessions.bind_room(id, code.clone()) {
            tracing::warn!(%id, error = %e, "bound room without a session");
        }

        self.reply(id, ack, RoomAck::success(code.clone(), members.clone()));

        if push_players {
            let targets: Vec<ConnectionId> =
                members.iter().map(|m| m.id).collect();
            self.relay.dispatch(
                &targets,
                Recipient::All,
                ServerEvent::Players(members).into(),
            );
        }
    }

    fn announce_departure(&mut self, departure: Departure) {
        if !departure.room_closed {
            self.relay.dispatch(
                &departure.remaining,
                Recipient::All,
                ServerEvent::Players(departure.members).into(),
            );
            return;
        }

        for member in &departure.remaining {
            self.sessions.unbind_room(*member);
        }
        if departure.was_host {
            self.relay.dispatch(
                &departure.remaining,
                Recipient::All,
                ServerEvent::Closed.into(),
            );
        }
    }

    fn reply(&self, id: ConnectionId, ack: Option<u64>, data: RoomAck) {
        if let Some(ack) = ack {
            self.relay.send_to(id, ServerFrame::Ack { ack, data });
        }
    }
}

/// Wall-clock time in milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

// =========================================================================
// Tests
// =========================================================================
