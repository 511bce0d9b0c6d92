//! # Relay Hub
//!
//! Accepts WebSocket connections at `/ws` and fans events out between
//! every connected web and mobile client.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Relay Architecture                             │
//! │                                                                         │
//! │  /ws ──▶ upgrade ──▶ handle_socket (one task per connection)            │
//! │                          │                                              │
//! │          ┌───────────────┼───────────────────┐                          │
//! │          ▼               ▼                   ▼                          │
//! │   receive loop     forward task          ping task                      │
//! │   parse frame      broadcast_rx ──┐      every N secs                   │
//! │   dispatch()       filter by      │                                     │
//! │      │             audience       ▼                                     │
//! │      │                      outgoing mpsc ──▶ socket sink               │
//! │      ├── Origin ────────────────▲                                       │
//! │      └── All / Others ──▶ broadcast_tx (one JSON frame per event)       │
//! │                                                                         │
//! │  Message Flow:                                                          │
//! │  ─────────────                                                          │
//! │  1. Client connects, gets a fresh id and the welcome victor-message     │
//! │  2. Client sends {"event", "data"} frames                               │
//! │  3. Dispatcher persists and decides who hears about it                  │
//! │  4. Hub pings periodically; disconnect removes the client               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use victor_db::Database;

use crate::config::RelayConfig;
use crate::dispatcher::{dispatch, Outbound};
use crate::error::{RelayError, RelayResult};
use crate::protocol::{ClientEvent, ServerEvent};

// =============================================================================
// Broadcast Envelope
// =============================================================================

/// Which connections receive a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    All,
    AllExcept(String),
}

impl Audience {
    pub fn includes(&self, client_id: &str) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(origin) => origin != client_id,
        }
    }
}

/// A serialized event on its way to every forward task.
///
/// Encoded once here rather than once per connection.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub audience: Audience,
    pub frame: Arc<str>,
}

// =============================================================================
// Connected Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct ConnectedClient {
    pub id: String,
    pub connected_at: DateTime<Utc>,
}

// =============================================================================
// Relay State
// =============================================================================

struct RelayState {
    config: RelayConfig,
    db: Database,
    clients: RwLock<HashMap<String, ConnectedClient>>,
    broadcast_tx: broadcast::Sender<Envelope>,
}

impl RelayState {
    fn publish(&self, audience: Audience, event: &ServerEvent) -> RelayResult<()> {
        let frame: Arc<str> = event.to_json()?.into();
        // No subscribers is not an error: nobody is connected.
        let _ = self.broadcast_tx.send(Envelope { audience, frame });
        Ok(())
    }

    async fn register(&self, id: &str) {
        let mut clients = self.clients.write().await;
        clients.insert(
            id.to_string(),
            ConnectedClient {
                id: id.to_string(),
                connected_at: Utc::now(),
            },
        );
    }

    async fn remove(&self, id: &str) {
        let mut clients = self.clients.write().await;
        if clients.remove(id).is_some() {
            info!(client_id = %id, remaining = clients.len(), "Client removed");
        }
    }
}

// =============================================================================
// Relay Handle
// =============================================================================

/// Cloneable handle shared by the socket endpoint and the REST handlers.
#[derive(Clone)]
pub struct RelayHandle {
    state: Arc<RelayState>,
}

impl RelayHandle {
    pub fn new(config: RelayConfig, db: Database) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_capacity);
        RelayHandle {
            state: Arc::new(RelayState {
                config,
                db,
                clients: RwLock::new(HashMap::new()),
                broadcast_tx,
            }),
        }
    }

    /// Sends an event to every connected client.
    pub fn broadcast(&self, event: &ServerEvent) -> RelayResult<()> {
        self.state.publish(Audience::All, event)
    }

    pub async fn client_count(&self) -> usize {
        self.state.clients.read().await.len()
    }

    /// Connected clients, oldest connection first.
    pub async fn clients(&self) -> Vec<ConnectedClient> {
        let mut clients: Vec<ConnectedClient> =
            self.state.clients.read().await.values().cloned().collect();
        clients.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));
        clients
    }

    /// Router serving the `/ws` endpoint, ready to merge into the app.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .with_state(self.state.clone())
    }
}

// =============================================================================
// WebSocket Handler
// =============================================================================

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.max_message_size(state.config.transport_limit())
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let client_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before registering so nothing published after the client
    // shows up in the count is missed.
    let mut broadcast_rx = state.broadcast_tx.subscribe();
    state.register(&client_id).await;
    info!(client_id = %client_id, "Client connected");

    let welcome = ServerEvent::welcome(&state.config.welcome_message, Utc::now());
    if let Err(e) = send_event(&mut sender, &welcome).await {
        warn!(client_id = %client_id, error = %e, "Failed to send welcome");
        state.remove(&client_id).await;
        return;
    }

    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(state.config.outgoing_queue);

    let outgoing_handle = tokio::spawn(async move {
        while let Some(msg) = outgoing_rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let forward_tx = outgoing_tx.clone();
    let forward_id = client_id.clone();
    let forward_handle = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(envelope) => {
                    if !envelope.audience.includes(&forward_id) {
                        continue;
                    }
                    let frame = Message::Text(envelope.frame.to_string().into());
                    if forward_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(client_id = %forward_id, skipped, "Broadcast receiver lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let ping_tx = outgoing_tx.clone();
    let ping_every = state.config.ping_interval();
    let ping_handle = tokio::spawn(async move {
        let mut ticker = interval(ping_every);
        // The first tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if ping_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                break;
            }
        }
    });

    loop {
        match receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    handle_frame(&state, &client_id, text.as_str(), &outgoing_tx).await;
                }
                Message::Binary(data) => match std::str::from_utf8(&data) {
                    Ok(text) => handle_frame(&state, &client_id, text, &outgoing_tx).await,
                    Err(_) => {
                        let err = RelayError::Protocol("binary frame is not UTF-8".into());
                        reply(&outgoing_tx, &ServerEvent::error(err.to_string())).await;
                    }
                },
                // The WebSocket layer answers pings itself.
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Close(_) => {
                    info!(client_id = %client_id, "Client requested close");
                    break;
                }
            },
            Some(Err(e)) => {
                warn!(client_id = %client_id, error = %e, "WebSocket error");
                break;
            }
            None => {
                info!(client_id = %client_id, "Client disconnected");
                break;
            }
        }
    }

    ping_handle.abort();
    forward_handle.abort();
    outgoing_handle.abort();
    state.remove(&client_id).await;
}

/// Parses one frame, dispatches it and routes the results.
async fn handle_frame(
    state: &RelayState,
    client_id: &str,
    text: &str,
    outgoing_tx: &mpsc::Sender<Message>,
) {
    let max = state.config.max_message_size;
    if text.len() > max {
        let err = RelayError::FrameTooLarge {
            size: text.len(),
            max,
        };
        debug!(client_id = %client_id, error = %err, "Oversized frame");
        reply(outgoing_tx, &ServerEvent::error(err.to_string())).await;
        return;
    }

    let event = match ClientEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(client_id = %client_id, error = %e, "Invalid frame");
            let err = RelayError::Protocol(e.to_string());
            reply(outgoing_tx, &ServerEvent::error(err.to_string())).await;
            return;
        }
    };

    for outbound in dispatch(&state.db, client_id, event).await {
        let result = match outbound {
            Outbound::Origin(event) => {
                reply(outgoing_tx, &event).await;
                Ok(())
            }
            Outbound::All(event) => state.publish(Audience::All, &event),
            Outbound::Others(event) => {
                state.publish(Audience::AllExcept(client_id.to_string()), &event)
            }
        };
        if let Err(e) = result {
            warn!(client_id = %client_id, error = %e, "Failed to publish event");
        }
    }
}

/// Queues an event for this connection only.
async fn reply(outgoing_tx: &mpsc::Sender<Message>, event: &ServerEvent) {
    match event.to_json() {
        Ok(json) => {
            let _ = outgoing_tx.send(Message::Text(json.into())).await;
        }
        Err(e) => warn!(event = event.name(), error = %e, "Failed to encode event"),
    }
}

async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> RelayResult<()> {
    let json = event.to_json()?;
    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| RelayError::Transport(format!("Send error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use victor_db::DbConfig;

    async fn handle() -> RelayHandle {
        handle_with(RelayConfig::default()).await
    }

    async fn handle_with(config: RelayConfig) -> RelayHandle {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        RelayHandle::new(config, db)
    }

    async fn next_reply(rx: &mut mpsc::Receiver<Message>) -> serde_json::Value {
        match rx.recv().await {
            Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[test]
    fn test_audience_filter() {
        assert!(Audience::All.includes("a"));
        assert!(Audience::AllExcept("a".into()).includes("b"));
        assert!(!Audience::AllExcept("a".into()).includes("a"));
    }

    #[tokio::test]
    async fn test_broadcast_without_clients_is_ok() {
        let relay = handle().await;
        assert_eq!(relay.client_count().await, 0);
        assert!(relay.broadcast(&ServerEvent::error("nobody listening")).is_ok());
    }

    #[tokio::test]
    async fn test_location_from_origin_is_published_to_others() {
        let relay = handle().await;
        let mut broadcasts = relay.state.broadcast_tx.subscribe();
        let (tx, _rx) = mpsc::channel(4);

        let frame = r#"{"event":"location-update","data":{"lat":1.0,"lng":2.0,"accuracy":3.0}}"#;
        handle_frame(&relay.state, "conn-1", frame, &tx).await;

        let envelope = broadcasts.recv().await.unwrap();
        assert_eq!(envelope.audience, Audience::AllExcept("conn-1".into()));
        assert!(envelope.frame.contains("\"event\":\"location-update\""));
    }

    #[tokio::test]
    async fn test_oversized_frame_gets_error_reply() {
        let relay = handle_with(RelayConfig {
            max_message_size: 32,
            ..Default::default()
        })
        .await;
        let mut broadcasts = relay.state.broadcast_tx.subscribe();
        let (tx, mut rx) = mpsc::channel(4);

        let frame = format!(
            r#"{{"event":"victor-message","data":{{"text":"{}","sender":"user"}}}}"#,
            "x".repeat(64)
        );
        handle_frame(&relay.state, "conn-1", &frame, &tx).await;

        let reply = next_reply(&mut rx).await;
        assert_eq!(reply["event"], "error");
        assert!(reply["data"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Frame too large"));
        assert!(broadcasts.try_recv().is_err());
        assert_eq!(relay.state.db.messages().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_and_remove() {
        let relay = handle().await;
        relay.state.register("conn-1").await;
        let clients = relay.clients().await;
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id, "conn-1");

        relay.state.remove("conn-1").await;
        assert_eq!(relay.client_count().await, 0);
    }
}
