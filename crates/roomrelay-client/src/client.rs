//! `LobbyClient`: one connection to a relay, its room, and its metadata.
//!
//! A client owns at most one live connection. Two background tasks serve
//! it: a writer draining an outbound channel into the socket, and a reader
//! that applies acks and pushes to local state before fanning them out to
//! subscribers. Both are spawned exactly once per connection, so a
//! reconnect never doubles the handlers.
//!
//! ```text
//! caller ──► outbound mpsc ──► writer ──► socket
//! socket ──► reader ──► pending acks / local state ──► broadcast events
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use roomrelay_protocol::{
    BroadcastRequest, ClientCommand, ClientFrame, Codec, ConnectionId,
    CreateRoomRequest, Handshake, JoinRoomRequest, JsonCodec, MemberRecord,
    PROTOCOL_VERSION, ProtocolError, RelayedEvent, RoomAck, RoomCode,
    ServerEvent, ServerFrame, SessionInfo, events,
};
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::AttemptFailure;
use crate::{ClientConfig, ClientError, ClientEvent};

/// Relayed event type used to share per-member metadata.
pub const METADATA_EVENT: &str = "player:metadata";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SocketSink = SplitSink<Socket, Message>;
type SocketStream = SplitStream<Socket>;

/// A room the client is in, as the server last described it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    pub code: RoomCode,
    pub players: Vec<MemberRecord>,
}

/// Client session adapter for a roomrelay server.
///
/// Cheap to clone; clones share the same connection and state. Must be
/// created inside a Tokio runtime.
///
/// # Example
///
/// ```rust,no_run
/// use roomrelay_client::{ClientConfig, LobbyClient};
///
/// # async fn play() -> Result<(), roomrelay_client::ClientError> {
/// let client = LobbyClient::new(ClientConfig::new("ws://127.0.0.1:4000"));
/// let room = client.create_room(None).await?;
/// println!("share this code: {}", room.code);
/// client.broadcast("chat", serde_json::json!({ "text": "hi" }))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LobbyClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    codec: JsonCodec,
    /// Held for the whole of a connection attempt.
    connect_gate: tokio::sync::Mutex<()>,
    finished_attempts: AtomicU64,
    last_failure: Mutex<Option<AttemptFailure>>,
    link: Mutex<Option<Link>>,
    local: Mutex<LocalState>,
    pending: Mutex<HashMap<u64, oneshot::Sender<RoomAck>>>,
    next_ack: AtomicU64,
    next_generation: AtomicU64,
    /// Set by [`LobbyClient::disconnect`]; suppresses auto-reconnect.
    closing: AtomicBool,
    events: broadcast::Sender<ClientEvent>,
    dropped_tx: mpsc::UnboundedSender<u64>,
}

/// The live connection. Dropping it ends the writer, which closes the
/// socket.
struct Link {
    id: ConnectionId,
    generation: u64,
    outbound: mpsc::UnboundedSender<String>,
}

#[derive(Debug, Default)]
struct LocalState {
    display_name: Option<String>,
    room: Option<RoomCode>,
    players: Vec<MemberRecord>,
    metadata: Map<String, Value>,
    peers: HashMap<ConnectionId, Map<String, Value>>,
}

impl LocalState {
    fn clear_room(&mut self) -> Option<RoomCode> {
        self.players.clear();
        self.peers.clear();
        self.room.take()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl LobbyClient {
    /// Creates a client. Nothing connects until the first call that needs
    /// a connection.
    pub fn new(config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (dropped_tx, dropped_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            local: Mutex::new(LocalState {
                display_name: config.name.as_deref().and_then(clean_name),
                ..LocalState::default()
            }),
            config,
            codec: JsonCodec,
            connect_gate: tokio::sync::Mutex::new(()),
            finished_attempts: AtomicU64::new(0),
            last_failure: Mutex::new(None),
            link: Mutex::new(None),
            pending: Mutex::new(HashMap::new()),
            next_ack: AtomicU64::new(1),
            next_generation: AtomicU64::new(1),
            closing: AtomicBool::new(false),
            events,
            dropped_tx,
        });
        tokio::spawn(supervise(Arc::downgrade(&inner), dropped_rx));
        Self { inner }
    }

    /// Connects if needed and returns this client's connection id.
    ///
    /// Concurrent callers share one attempt: whoever arrives while an
    /// attempt is running gets that attempt's outcome. A `name` replaces
    /// the display name used for this and later handshakes.
    pub async fn ensure_connection(
        &self,
        name: Option<&str>,
    ) -> Result<ConnectionId, ClientError> {
        self.inner.ensure_connection(name).await
    }

    /// Creates a room, optionally with a caller-chosen code, and enters it
    /// as host.
    pub async fn create_room(
        &self,
        room_code: Option<&str>,
    ) -> Result<RoomView, ClientError> {
        let command = ClientCommand::CreateRoom(CreateRoomRequest {
            room_code: room_code.map(str::to_string),
        });
        self.inner.request(command).await
    }

    /// Joins an existing room. `name` overrides the display name.
    pub async fn join_room(
        &self,
        room_code: &str,
        name: Option<&str>,
    ) -> Result<RoomView, ClientError> {
        if let Some(name) = name {
            self.set_display_name(name);
        }
        let name = lock(&self.inner.local).display_name.clone();
        let command = ClientCommand::JoinRoom(JoinRoomRequest {
            room_code: Some(room_code.to_string()),
            name,
        });
        self.inner.request(command).await
    }

    /// Relays an event to the other members of the current room.
    ///
    /// Does nothing outside a room.
    pub fn broadcast(
        &self,
        kind: &str,
        payload: Value,
    ) -> Result<(), ClientError> {
        let Some(code) = self.room_code() else {
            tracing::debug!(kind, "not in a room, broadcast skipped");
            return Ok(());
        };
        self.inner.send_broadcast(&code, kind, payload)
    }

    /// Leaves the current room and forgets its local state.
    pub fn leave_room(&self) -> Result<(), ClientError> {
        let left = lock(&self.inner.local).clear_room();
        if left.is_none() {
            return Ok(());
        }
        let frame = ClientFrame::from_command(&ClientCommand::LeaveRoom, None)?;
        match self.inner.send_frame(&frame) {
            Ok(()) | Err(ClientError::NotConnected) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Sets the display name used for the next handshake or join.
    pub fn set_display_name(&self, name: &str) {
        if let Some(name) = clean_name(name) {
            lock(&self.inner.local).display_name = Some(name);
        }
    }

    /// Merges `patch` into this client's metadata and shares the result
    /// with the room, if in one.
    pub fn set_local_metadata(
        &self,
        patch: Map<String, Value>,
    ) -> Result<(), ClientError> {
        let share = {
            let mut local = lock(&self.inner.local);
            merge(&mut local.metadata, patch);
            local
                .room
                .clone()
                .map(|code| (code, local.metadata.clone()))
        };
        match share {
            Some((code, metadata)) => self.inner.send_broadcast(
                &code,
                METADATA_EVENT,
                Value::Object(metadata),
            ),
            None => Ok(()),
        }
    }

    /// Closes the connection without reconnecting.
    pub fn disconnect(&self) {
        self.inner.closing.store(true, Ordering::SeqCst);
        let link = lock(&self.inner.link).take();
        if link.is_some() {
            self.inner.forget_connection();
            tracing::info!("disconnected");
            self.inner.emit(ClientEvent::Disconnected);
        }
    }

    /// Subscribes to client events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.inner.current_id()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_id().is_some()
    }

    pub fn display_name(&self) -> Option<String> {
        lock(&self.inner.local).display_name.clone()
    }

    pub fn room_code(&self) -> Option<RoomCode> {
        lock(&self.inner.local).room.clone()
    }

    /// The member list from the latest ack or `room:players` push.
    pub fn players(&self) -> Vec<MemberRecord> {
        lock(&self.inner.local).players.clone()
    }

    pub fn local_metadata(&self) -> Map<String, Value> {
        lock(&self.inner.local).metadata.clone()
    }

    /// Merged metadata another member has shared in the current room.
    pub fn peer_metadata(
        &self,
        id: ConnectionId,
    ) -> Option<Map<String, Value>> {
        lock(&self.inner.local).peers.get(&id).cloned()
    }
}

impl std::fmt::Debug for LobbyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LobbyClient")
            .field("url", &self.inner.config.url)
            .field("connection", &self.connection_id())
            .field("room", &self.room_code())
            .finish()
    }
}

impl Inner {
    fn current_id(&self) -> Option<ConnectionId> {
        lock(&self.link).as_ref().map(|link| link.id)
    }

    fn emit(&self, event: ClientEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Drops room state and wakes every waiting request with `Closed`.
    fn forget_connection(&self) {
        lock(&self.pending).clear();
        lock(&self.local).clear_room();
    }

    async fn ensure_connection(
        self: &Arc<Self>,
        name: Option<&str>,
    ) -> Result<ConnectionId, ClientError> {
        if let Some(name) = name.and_then(clean_name) {
            lock(&self.local).display_name = Some(name);
        }
        if let Some(id) = self.current_id() {
            return Ok(id);
        }

        let seen = self.finished_attempts.load(Ordering::SeqCst);
        let _gate = self.connect_gate.lock().await;
        if let Some(id) = self.current_id() {
            return Ok(id);
        }
        if self.finished_attempts.load(Ordering::SeqCst) != seen {
            // An attempt finished while we waited and left no link.
            if let Some(failure) = lock(&self.last_failure).clone() {
                return Err(failure.into());
            }
        }

        self.closing.store(false, Ordering::SeqCst);
        let result = self.connect_with_retry().await;
        if let Err(failure) = &result {
            *lock(&self.last_failure) = Some(failure.clone());
        }
        self.finished_attempts.fetch_add(1, Ordering::SeqCst);
        result.map(|info| info.id).map_err(ClientError::from)
    }

    async fn connect_with_retry(
        self: &Arc<Self>,
    ) -> Result<SessionInfo, AttemptFailure> {
        let policy = &self.config.reconnect;
        let mut retry = 0;
        loop {
            match self.connect_once().await {
                Ok(info) => return Ok(info),
                Err(ClientError::Refused(message)) => {
                    tracing::warn!(%message, "server refused connection");
                    return Err(AttemptFailure::Refused(message));
                }
                Err(e) if retry >= policy.max_retries => {
                    tracing::warn!(error = %e, "giving up connecting");
                    return Err(AttemptFailure::Exhausted {
                        attempts: retry + 1,
                        last: e.to_string(),
                    });
                }
                Err(e) => {
                    let delay = policy.delay_for(retry);
                    tracing::debug!(
                        retry,
                        ?delay,
                        error = %e,
                        "connect failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
            }
        }
    }

    /// One attempt: open the socket, handshake, install the link, spawn
    /// the reader and writer.
    async fn connect_once(self: &Arc<Self>) -> Result<SessionInfo, ClientError> {
        let (socket, _) =
            tokio_tungstenite::connect_async(self.config.url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        let handshake = ClientCommand::Handshake(Handshake {
            version: PROTOCOL_VERSION,
            name: lock(&self.local).display_name.clone(),
        });
        let frame = ClientFrame::from_command(&handshake, None)?;
        sink.send(Message::Text(self.encode(&frame)?.into())).await?;

        let timeout = self.config.ack_timeout;
        let reply =
            tokio::time::timeout(timeout, next_frame(&mut stream, &self.codec))
                .await
                .map_err(|_| ClientError::AckTimeout {
                    event: events::HANDSHAKE,
                    timeout,
                })??;
        let info = match reply {
            ServerFrame::Push(ServerEvent::SessionReady(info)) => info,
            ServerFrame::Push(ServerEvent::ConnectError(error)) => {
                return Err(ClientError::Refused(error.message));
            }
            other => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "expected {}, got {other:?}",
                    events::SESSION_READY
                ))
                .into());
            }
        };

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let (outbound, rx) = mpsc::unbounded_channel();
        *lock(&self.link) = Some(Link {
            id: info.id,
            generation,
            outbound,
        });
        lock(&self.local).display_name = Some(info.name.clone());

        tokio::spawn(write_loop(sink, rx));
        tokio::spawn(read_loop(Arc::downgrade(self), stream, generation));

        tracing::info!(id = %info.id, name = %info.name, "connected");
        self.emit(ClientEvent::Connected(info.clone()));
        Ok(info)
    }

    /// Sends a command that expects an ack and waits for the reply.
    async fn request(
        self: &Arc<Self>,
        command: ClientCommand,
    ) -> Result<RoomView, ClientError> {
        self.ensure_connection(None).await?;

        let ack = self.next_ack.fetch_add(1, Ordering::SeqCst);
        let frame = ClientFrame::from_command(&command, Some(ack))?;
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(ack, tx);
        if let Err(e) = self.send_frame(&frame) {
            lock(&self.pending).remove(&ack);
            return Err(e);
        }

        let timeout = self.config.ack_timeout;
        let reply = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(ClientError::Closed),
            Err(_) => {
                lock(&self.pending).remove(&ack);
                return Err(ClientError::AckTimeout {
                    event: command.event_name(),
                    timeout,
                });
            }
        };
        let (code, players) = reply.into_result().map_err(ClientError::Room)?;
        Ok(RoomView { code, players })
    }

    fn send_broadcast(
        &self,
        code: &RoomCode,
        kind: &str,
        payload: Value,
    ) -> Result<(), ClientError> {
        let command = ClientCommand::Broadcast(BroadcastRequest {
            room_code: Some(code.as_str().to_string()),
            kind: Some(kind.to_string()),
            payload,
        });
        self.send_frame(&ClientFrame::from_command(&command, None)?)
    }

    fn send_frame(&self, frame: &ClientFrame) -> Result<(), ClientError> {
        let text = self.encode(frame)?;
        let link = lock(&self.link);
        let Some(link) = link.as_ref() else {
            return Err(ClientError::NotConnected);
        };
        link.outbound.send(text).map_err(|_| ClientError::Closed)
    }

    fn encode(&self, frame: &ClientFrame) -> Result<String, ClientError> {
        let bytes = self.codec.encode(frame)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Applies one server frame. Runs on the reader task, so state is
    /// updated before the next frame from the same connection.
    fn on_frame(&self, frame: ServerFrame) {
        match frame {
            ServerFrame::Ack { ack, data } => {
                if let (true, Some(code)) = (data.ok, data.room_code.clone()) {
                    let mut local = lock(&self.local);
                    if local.room.as_ref() != Some(&code) {
                        local.peers.clear();
                    }
                    local.room = Some(code);
                    local.players = data.players.clone().unwrap_or_default();
                }
                match lock(&self.pending).remove(&ack) {
                    Some(waiter) => {
                        let _ = waiter.send(data);
                    }
                    None => tracing::debug!(ack, "ack with no waiter"),
                }
            }
            ServerFrame::Push(ServerEvent::Players(players)) => {
                self.on_players(players);
            }
            ServerFrame::Push(ServerEvent::Event(event)) => {
                self.on_relayed(event);
            }
            ServerFrame::Push(ServerEvent::Closed) => {
                let code = lock(&self.local).clear_room();
                tracing::info!(room = ?code, "room closed by host");
                self.emit(ClientEvent::RoomClosed { code });
            }
            ServerFrame::Push(other) => {
                tracing::debug!(?other, "unexpected push after handshake");
            }
        }
    }

    fn on_players(&self, players: Vec<MemberRecord>) {
        let share = {
            let mut local = lock(&self.local);
            let Some(code) = local.room.clone() else {
                return;
            };
            local
                .peers
                .retain(|id, _| players.iter().any(|p| p.id == *id));
            local.players = players.clone();
            (!local.metadata.is_empty())
                .then(|| (code, local.metadata.clone()))
        };
        self.emit(ClientEvent::Players(players));

        // Newcomers have not seen our metadata yet.
        if let Some((code, metadata)) = share {
            if let Err(e) =
                self.send_broadcast(&code, METADATA_EVENT, Value::Object(metadata))
            {
                tracing::debug!(error = %e, "metadata re-share failed");
            }
        }
    }

    fn on_relayed(&self, event: RelayedEvent) {
        if event.kind == METADATA_EVENT {
            if let Value::Object(patch) = &event.payload {
                let metadata = {
                    let mut local = lock(&self.local);
                    let entry = local.peers.entry(event.from).or_default();
                    merge(entry, patch.clone());
                    entry.clone()
                };
                self.emit(ClientEvent::Metadata {
                    from: event.from,
                    metadata,
                });
            }
        }
        self.emit(ClientEvent::RoomEvent(event));
    }

    /// Called by the reader when its socket ends.
    fn on_disconnect(&self, generation: u64) {
        {
            let mut link = lock(&self.link);
            if !link.as_ref().is_some_and(|l| l.generation == generation) {
                return;
            }
            *link = None;
        }
        self.forget_connection();
        tracing::warn!(generation, "connection lost");
        self.emit(ClientEvent::Disconnected);
        let _ = self.dropped_tx.send(generation);
    }
}

/// Reads frames until the socket ends. Malformed frames are skipped.
async fn read_loop(inner: Weak<Inner>, mut stream: SocketStream, generation: u64) {
    loop {
        let frame = next_frame(&mut stream, &JsonCodec).await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        match frame {
            Ok(frame) => inner.on_frame(frame),
            Err(ClientError::Protocol(e)) => {
                tracing::debug!(error = %e, "failed to decode frame");
            }
            Err(e) => {
                tracing::debug!(error = %e, "reader stopped");
                inner.on_disconnect(generation);
                return;
            }
        }
    }
}

/// Drains encoded frames into the socket, then closes it.
async fn write_loop(mut sink: SocketSink, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(text) = rx.recv().await {
        if let Err(e) = sink.send(Message::Text(text.into())).await {
            tracing::debug!(error = %e, "send failed, stopping writer");
            break;
        }
    }
    let _ = sink.close().await;
}

/// Reconnects after unexpected drops, if the policy allows it.
async fn supervise(inner: Weak<Inner>, mut dropped: mpsc::UnboundedReceiver<u64>) {
    while let Some(generation) = dropped.recv().await {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if !inner.config.reconnect.auto_reconnect
            || inner.closing.load(Ordering::SeqCst)
        {
            continue;
        }
        tracing::info!(generation, "reconnecting");
        if let Err(e) = inner.ensure_connection(None).await {
            tracing::warn!(error = %e, "reconnect failed");
        }
    }
}

/// Waits for the next decodable-or-not server frame.
async fn next_frame(
    stream: &mut SocketStream,
    codec: &JsonCodec,
) -> Result<ServerFrame, ClientError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                return Ok(codec.decode(text.as_bytes())?);
            }
            Some(Ok(Message::Binary(data))) => return Ok(codec.decode(&data)?),
            Some(Ok(Message::Close(_))) | None => {
                return Err(ClientError::Closed);
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_merge_overwrites_and_keeps_other_keys() {
        let mut target = object(json!({ "color": "red", "ready": false }));
        merge(&mut target, object(json!({ "ready": true })));
        assert_eq!(Value::Object(target), json!({ "color": "red", "ready": true }));
    }

    #[test]
    fn test_clean_name_trims_and_rejects_blank() {
        assert_eq!(clean_name("  Ada "), Some("Ada".to_string()));
        assert_eq!(clean_name("   "), None);
    }

    #[test]
    fn test_clear_room_drops_roster_and_peers() {
        let mut local = LocalState {
            room: RoomCode::normalize("ABCD"),
            players: vec![MemberRecord {
                id: ConnectionId::new(1),
                name: "Ada".to_string(),
                is_host: true,
            }],
            ..LocalState::default()
        };
        local.peers.insert(ConnectionId::new(2), Map::new());

        assert_eq!(local.clear_room(), RoomCode::normalize("ABCD"));
        assert!(local.players.is_empty());
        assert!(local.peers.is_empty());
        assert!(local.clear_room().is_none());
    }

    #[tokio::test]
    async fn test_broadcast_outside_room_is_noop() {
        let client = LobbyClient::new(ClientConfig::new("ws://127.0.0.1:1"));
        assert!(client.broadcast("chat", json!({})).is_ok());
        assert!(client.leave_room().is_ok());
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_metadata_merges_without_room() {
        let client = LobbyClient::new(ClientConfig::new("ws://127.0.0.1:1"));
        client.set_local_metadata(object(json!({ "color": "red" }))).unwrap();
        client.set_local_metadata(object(json!({ "ready": true }))).unwrap();
        assert_eq!(
            Value::Object(client.local_metadata()),
            json!({ "color": "red", "ready": true })
        );
    }

    #[tokio::test]
    async fn test_metadata_event_merges_per_member() {
        let client = LobbyClient::new(ClientConfig::new("ws://127.0.0.1:1"));
        let mut events = client.subscribe();
        let from = ConnectionId::new(7);
        for payload in [json!({ "color": "red" }), json!({ "ready": true })] {
            client.inner.on_frame(ServerFrame::Push(ServerEvent::Event(
                RelayedEvent {
                    from,
                    kind: METADATA_EVENT.to_string(),
                    payload,
                    ts: 0,
                },
            )));
        }

        assert_eq!(
            client.peer_metadata(from).map(Value::Object),
            Some(json!({ "color": "red", "ready": true }))
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            ClientEvent::Metadata { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            ClientEvent::RoomEvent(_)
        ));
    }

    #[tokio::test]
    async fn test_room_closed_clears_state() {
        let client = LobbyClient::new(ClientConfig::new("ws://127.0.0.1:1"));
        let mut events = client.subscribe();
        client.inner.on_frame(ServerFrame::Ack {
            ack: 1,
            data: RoomAck::success(
                RoomCode::normalize("WXYZ").unwrap(),
                Vec::new(),
            ),
        });
        assert_eq!(client.room_code(), RoomCode::normalize("WXYZ"));

        client.inner.on_frame(ServerFrame::Push(ServerEvent::Closed));

        assert!(client.room_code().is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::RoomClosed {
                code: RoomCode::normalize("WXYZ")
            }
        );
    }
}
