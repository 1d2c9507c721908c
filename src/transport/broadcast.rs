//! Websocket server that keeps every viewer connected and fans each
//! message out to all of them.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use dashmap::DashMap;
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::TransportError;
use crate::message::OutgoingMessage;

use super::Delivery;

/// Write half of one connected viewer.
#[async_trait]
pub trait ClientSink: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), TransportError>;
}

/// The set of connected viewers.
///
/// Registration, removal and eviction all happen here. A broadcast sends to
/// a snapshot of the set, so no map guard is held across an await.
#[derive(Clone)]
pub struct ClientRegistry {
    clients: Arc<DashMap<Uuid, Arc<dyn ClientSink>>>,
    poll: Duration,
}

impl ClientRegistry {
    pub fn new(poll: Duration) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            poll,
        }
    }

    pub fn register(&self, sink: Arc<dyn ClientSink>) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.insert(id, sink);
        id
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.clients.remove(id).is_some()
    }

    /// Membership check for callers holding an id; the server itself only registers and removes.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.clients.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Send to every viewer; viewers whose send fails are evicted.
    pub async fn broadcast(&self, message: &OutgoingMessage) -> Result<usize, TransportError> {
        let targets: Vec<(Uuid, Arc<dyn ClientSink>)> = self
            .clients
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        if targets.is_empty() {
            return Ok(0);
        }

        let payload = message.to_json()?;
        info!("📡 [BROADCAST] Sending to {} viewer(s): {}", targets.len(), payload);

        let mut delivered = 0;
        for (id, sink) in targets {
            match sink.send_text(&payload).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("⚠️ [BROADCAST] Dropping viewer {}: {}", id, e);
                    self.clients.remove(&id);
                }
            }
        }
        Ok(delivered)
    }

    /// Suspend until at least one viewer is connected.
    pub async fn wait_for_listener(&self) {
        if self.is_empty() {
            info!("⏳ [BROADCAST] Waiting for the first viewer...");
        }
        while self.is_empty() {
            tokio::time::sleep(self.poll).await;
        }
    }
}

#[async_trait]
impl Delivery for ClientRegistry {
    async fn wait_until_ready(&self) {
        self.wait_for_listener().await;
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<usize, TransportError> {
        self.broadcast(message).await
    }
}

/// Sink over the write half of an axum websocket
struct WsClientSink {
    inner: Mutex<SplitSink<WebSocket, Message>>,
}

#[async_trait]
impl ClientSink for WsClientSink {
    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.inner
            .lock()
            .await
            .send(Message::Text(text.to_string().into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

struct ServerState {
    registry: ClientRegistry,
    greeting: String,
}

/// Router serving the viewer websocket at `path`.
pub fn router(registry: ClientRegistry, path: &str, greeting: String) -> Router {
    let state = Arc::new(ServerState { registry, greeting });
    Router::new().route(path, get(ws_handler)).with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: Arc<ServerState>) {
    let (sink, mut stream) = socket.split();
    let sink: Arc<dyn ClientSink> = Arc::new(WsClientSink { inner: Mutex::new(sink) });

    let id = state.registry.register(sink.clone());
    info!("★ [BROADCAST] Viewer {} connected ({} total)", id, state.registry.len());

    let greeting = OutgoingMessage::chat(state.greeting.clone());
    let greeted = match greeting.to_json() {
        Ok(json) => sink.send_text(&json).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = greeted {
        warn!("⚠️ [BROADCAST] Greeting to {} failed: {}", id, e);
    } else {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("[BROADCAST] Viewer {} read error: {}", id, e);
                    break;
                }
            }
        }
    }

    state.registry.remove(&id);
    info!("👋 [BROADCAST] Viewer {} disconnected ({} left)", id, state.registry.len());
}

/// Serve viewers on an already bound listener until the server stops.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> std::io::Result<()> {
    info!("📡 [BROADCAST] Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
