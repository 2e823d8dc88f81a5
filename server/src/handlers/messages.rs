use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::connections::ConnectionStatus;
use crate::db::models::messages::{Message, NewMessage};
use crate::db::models::notifications::{kinds, NewNotification, Notification};
use crate::db::repositories::connections::ConnectionRepository;
use crate::db::repositories::messages::MessageRepository;
use crate::db::repositories::notifications::NotificationRepository;
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::realtime::RealtimeEvent;
use crate::router::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Deserialize, Debug)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    pub content: String,
}

enum SendOutcome {
    Sent {
        message: Message,
        notification: Notification,
        recipient: Uuid,
    },
    ConnectionNotFound,
    NotAParty,
    NotAccepted(ConnectionStatus),
}

// Handler for POST /v0/connections/:id/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let content = body.content.trim().to_string();
    if content.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "content must not be empty".to_string(),
        ));
    }

    debug!("Message on connection {} from {}", connection_id, body.sender_id);

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let connections = ConnectionRepository::new(pool.clone());
        let messages = MessageRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool.clone());
        let users = UserRepository::new(pool);

        let connection = match connections.find(connection_id)? {
            Some(connection) => connection,
            None => return Ok(SendOutcome::ConnectionNotFound),
        };
        let recipient = match connection.other_party(body.sender_id) {
            Some(recipient) => recipient,
            None => return Ok(SendOutcome::NotAParty),
        };
        let status = ConnectionStatus::parse(&connection.status)
            .ok_or_else(|| anyhow::anyhow!("corrupt connection status {:?}", connection.status))?;
        if status != ConnectionStatus::Accepted {
            return Ok(SendOutcome::NotAccepted(status));
        }

        let message = messages.create(NewMessage {
            id: Uuid::new_v4(),
            connection_id,
            sender_id: body.sender_id,
            content,
        })?;
        let sender_name = users
            .find(body.sender_id)?
            .map(|u| u.name)
            .unwrap_or_else(|| "Someone".to_string());
        let notification = notifications.create(NewNotification::new(
            recipient,
            Some(body.sender_id),
            kinds::MESSAGE_NEW,
            format!("New message from {}", sender_name),
        ))?;
        Ok(SendOutcome::Sent {
            message,
            notification,
            recipient,
        })
    })
    .await?;

    match outcome {
        SendOutcome::Sent {
            message,
            notification,
            recipient,
        } => {
            state
                .realtime
                .publish(recipient, RealtimeEvent::new(kinds::MESSAGE_NEW, json!(&message)))
                .await;
            state
                .realtime
                .publish(
                    recipient,
                    RealtimeEvent::new("notification:new", json!(&notification)),
                )
                .await;
            Ok((StatusCode::CREATED, Json(message)))
        }
        SendOutcome::ConnectionNotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Connection with ID {} not found", connection_id),
        )),
        SendOutcome::NotAParty => Err((
            StatusCode::FORBIDDEN,
            "sender_id is not a party to this connection".to_string(),
        )),
        SendOutcome::NotAccepted(status) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "messages require an ACCEPTED connection, this one is {}",
                status.as_str()
            ),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct ListMessagesQuery {
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

// Handler for GET /v0/connections/:id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let pool = state.pool.clone();
    let page = run_blocking(move || {
        let connections = ConnectionRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        if connections.find(connection_id)?.is_none() {
            return Ok(None);
        }
        messages
            .list_for_connection(connection_id, query.before, limit)
            .map(Some)
    })
    .await?;

    match page {
        Some(messages) => Ok(Json(messages)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Connection with ID {} not found", connection_id),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct MarkReadRequest {
    pub user_id: Uuid,
}

#[derive(Serialize, Debug)]
pub struct MarkReadResponse {
    pub updated: usize,
}

enum MarkReadOutcome {
    Marked(usize),
    ConnectionNotFound,
    NotAParty,
}

// Handler for POST /v0/connections/:id/messages/read
pub async fn mark_messages_read(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Json(body): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let connections = ConnectionRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let connection = match connections.find(connection_id)? {
            Some(connection) => connection,
            None => return Ok(MarkReadOutcome::ConnectionNotFound),
        };
        if !connection.involves(body.user_id) {
            return Ok(MarkReadOutcome::NotAParty);
        }
        let updated = messages.mark_read(connection_id, body.user_id)?;
        Ok(MarkReadOutcome::Marked(updated))
    })
    .await?;

    match outcome {
        MarkReadOutcome::Marked(updated) => Ok(Json(MarkReadResponse { updated })),
        MarkReadOutcome::ConnectionNotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Connection with ID {} not found", connection_id),
        )),
        MarkReadOutcome::NotAParty => Err((
            StatusCode::FORBIDDEN,
            "user_id is not a party to this connection".to_string(),
        )),
    }
}
