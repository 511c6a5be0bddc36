//! HTTP health endpoint.
//!
//! `GET /health` answers `{"status":"ok","uptime":<seconds>}`. It's the
//! only HTTP surface the relay has and it carries no room data. CORS
//! follows the same `CLIENT_ORIGIN` policy the WebSocket upgrade uses.
//!
//! The route shares the WebSocket port. The transport hands requests for
//! [`HEALTH_PATH`] back unread, and they reach axum through
//! [`HealthListener`].

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router, extract::State};
use roomrelay_transport::OriginPolicy;
use serde::{Deserialize, Serialize};
use axum::serve::Listener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

/// Path of the health route.
pub const HEALTH_PATH: &str = "/health";

/// Plain HTTP connections waiting for the health router, at most.
const HANDOFF_BACKLOG: usize = 64;

/// Body of a `/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// Seconds since the process started serving.
    pub uptime: f64,
}

#[derive(Debug, Clone, Copy)]
struct HealthState {
    started: Instant,
}

async fn health_handler(State(state): State<HealthState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".to_string(),
        uptime: state.started.elapsed().as_secs_f64(),
    })
}

/// Builds the CORS layer for a `CLIENT_ORIGIN` policy.
pub fn cors_layer(origins: &OriginPolicy) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([axum::http::Method::GET]);
    match origins {
        OriginPolicy::Any => layer.allow_origin(Any),
        OriginPolicy::AllowList(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "invalid origin ignored for CORS");
                        None
                    }
                })
                .collect();
            layer.allow_origin(values)
        }
    }
}

/// Creates the health router. Uptime counts from `started`.
pub fn health_routes(started: Instant, origins: &OriginPolicy) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .with_state(HealthState { started })
        .layer(cors_layer(origins))
}

/// An axum [`Listener`] fed with connections the WebSocket transport
/// handed back.
pub(crate) struct HealthListener {
    incoming: mpsc::Receiver<(TcpStream, SocketAddr)>,
    local: SocketAddr,
}

/// Creates the handoff channel for the listener bound to `local`.
pub(crate) fn health_listener(
    local: SocketAddr,
) -> (mpsc::Sender<(TcpStream, SocketAddr)>, HealthListener) {
    let (tx, incoming) = mpsc::channel(HANDOFF_BACKLOG);
    (tx, HealthListener { incoming, local })
}

impl Listener for HealthListener {
    type Io = TcpStream;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        match self.incoming.recv().await {
            Some(conn) => conn,
            // Senders live as long as the accept loop; once it is gone
            // there is nothing left to serve.
            None => std::future::pending().await,
        }
    }

    fn local_addr(&self) -> std::io::Result<Self::Addr> {
        Ok(self.local)
    }
}
