//! Realtime push hub. Browser clients hold a websocket and subscribe with
//! their user id; the API server publishes JSON event envelopes over HTTP and
//! the hub forwards them to the subscribed socket. Best-effort only: if
//! nobody is subscribed the publish reports 404 and the event is dropped.

use std::{env, net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use uuid::Uuid;

// Maps a subscribed user id to the channel feeding their websocket.
pub type Subscribers = DashMap<Uuid, UnboundedSender<Message>>;

#[derive(Clone, Default)]
struct AppState {
    subscribers: Arc<Subscribers>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let state = AppState {
        subscribers: Arc::new(DashMap::new()),
    };

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/v0/publish/:user_id", post(publish))
        .with_state(state);

    let addr: SocketAddr = env::var("RELAY_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8081".to_string())
        .parse()
        .expect("RELAY_LISTEN_ADDR must be host:port");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Relay listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}

// -------- Websocket handler ---------
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(stream: WebSocket, state: AppState) {
    let (mut sender_ws, mut receiver_ws) = stream.split();
    let (sender_tx, mut receiver_tx): (UnboundedSender<Message>, UnboundedReceiver<Message>) =
        tokio::sync::mpsc::unbounded_channel();

    // Task: forward messages from internal channel to websocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = receiver_tx.recv().await {
            if sender_ws.send(msg).await.is_err() {
                break;
            }
        }
    });

    // The first (and only) control message is the subscription:
    // {"type":"subscribe","user_id":"..."}. A re-subscribe from a new socket
    // replaces the old sender, so each user has one live socket.
    let mut subscribed: Option<Uuid> = None;

    while let Some(Ok(msg)) = receiver_ws.next().await {
        match msg {
            Message::Text(text) => match parse_subscription(&text) {
                Ok(user_id) => {
                    state.subscribers.insert(user_id, sender_tx.clone());
                    subscribed = Some(user_id);
                    debug!("User {} subscribed", user_id);
                    let _ = sender_tx.send(Message::Text("subscribed".into()));
                }
                Err(e) => {
                    let _ = sender_tx.send(Message::Text(format!("error: {}", e)));
                }
            },
            Message::Close(_) => {
                break;
            }
            _ => {}
        }
    }

    // Connection ended. Clean up, unless a newer socket already took over.
    if let Some(user_id) = subscribed {
        if let Some(entry) = state.subscribers.get(&user_id) {
            if entry.same_channel(&sender_tx) {
                drop(entry);
                state.subscribers.remove(&user_id);
                debug!("User {} unsubscribed", user_id);
            }
        }
    }

    // ensure send task ends
    send_task.abort();
}

#[derive(Deserialize)]
struct SubMessage {
    r#type: String,
    user_id: String,
}

fn parse_subscription(text: &str) -> Result<Uuid, String> {
    let msg: SubMessage =
        serde_json::from_str(text).map_err(|_| "expected subscription JSON".to_string())?;
    if msg.r#type != "subscribe" {
        return Err(format!("unknown message type {:?}", msg.r#type));
    }
    Uuid::parse_str(&msg.user_id).map_err(|e| format!("invalid user_id: {}", e))
}

// -------- End Websocket handler ---------

// ---------- HTTP handlers --------------
async fn publish(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(event): Json<serde_json::Value>,
) -> impl IntoResponse {
    if let Some(sender) = state.subscribers.get(&user_id) {
        if sender.send(Message::Text(event.to_string())).is_err() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

// --------- End HTTP handlers ----------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_parsing() {
        let id = Uuid::new_v4();
        let ok = format!(r#"{{"type":"subscribe","user_id":"{}"}}"#, id);
        assert_eq!(parse_subscription(&ok), Ok(id));

        assert!(parse_subscription("not json").is_err());
        assert!(parse_subscription(r#"{"type":"subscribe","user_id":"nope"}"#).is_err());
        let wrong_type = format!(r#"{{"type":"unsubscribe","user_id":"{}"}}"#, id);
        assert!(parse_subscription(&wrong_type).is_err());
    }
}
