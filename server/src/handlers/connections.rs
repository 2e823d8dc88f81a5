use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::connections::{Connection, ConnectionStatus, NewConnection};
use crate::db::models::notifications::{kinds, NewNotification, Notification};
use crate::db::repositories::connections::ConnectionRepository;
use crate::db::repositories::notifications::NotificationRepository;
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::realtime::RealtimeEvent;
use crate::router::AppState;

#[derive(Deserialize, Debug)]
pub struct RequestConnectionRequest {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
}

enum RequestOutcome {
    Requested {
        connection: Connection,
        notification: Notification,
    },
    MentorNotFound,
    MenteeNotFound,
    RoleMismatch(&'static str),
    AlreadyLive,
}

// Handler for POST /v0/connections
pub async fn request_connection(
    State(state): State<AppState>,
    Json(body): Json<RequestConnectionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!(
        "Connection request: mentee {} -> mentor {}",
        body.mentee_id, body.mentor_id
    );

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let users = UserRepository::new(pool.clone());
        let connections = ConnectionRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool);

        let mentor = match users.find(body.mentor_id)? {
            Some(user) => user,
            None => return Ok(RequestOutcome::MentorNotFound),
        };
        if !mentor.is_mentor() {
            return Ok(RequestOutcome::RoleMismatch("mentor_id must refer to a MENTOR"));
        }
        let mentee = match users.find(body.mentee_id)? {
            Some(user) => user,
            None => return Ok(RequestOutcome::MenteeNotFound),
        };
        if !mentee.is_mentee() {
            return Ok(RequestOutcome::RoleMismatch("mentee_id must refer to a MENTEE"));
        }
        if connections
            .find_live_pair(body.mentor_id, body.mentee_id)?
            .is_some()
        {
            return Ok(RequestOutcome::AlreadyLive);
        }

        let connection = connections.create(NewConnection {
            id: Uuid::new_v4(),
            mentor_id: body.mentor_id,
            mentee_id: body.mentee_id,
            status: ConnectionStatus::Pending.as_str().to_string(),
        })?;
        let notification = notifications.create(NewNotification::new(
            body.mentor_id,
            Some(body.mentee_id),
            kinds::CONNECTION_REQUESTED,
            format!("{} wants to connect with you", mentee.name),
        ))?;
        Ok(RequestOutcome::Requested {
            connection,
            notification,
        })
    })
    .await?;

    match outcome {
        RequestOutcome::Requested {
            connection,
            notification,
        } => {
            state
                .realtime
                .publish(
                    connection.mentor_id,
                    RealtimeEvent::new(kinds::CONNECTION_REQUESTED, json!(&connection)),
                )
                .await;
            state
                .realtime
                .publish(
                    connection.mentor_id,
                    RealtimeEvent::new("notification:new", json!(&notification)),
                )
                .await;
            Ok((StatusCode::CREATED, Json(connection)))
        }
        RequestOutcome::MentorNotFound => Err((
            StatusCode::NOT_FOUND,
            "mentor not found".to_string(),
        )),
        RequestOutcome::MenteeNotFound => Err((
            StatusCode::NOT_FOUND,
            "mentee not found".to_string(),
        )),
        RequestOutcome::RoleMismatch(msg) => {
            Err((StatusCode::UNPROCESSABLE_ENTITY, msg.to_string()))
        }
        RequestOutcome::AlreadyLive => Err((
            StatusCode::CONFLICT,
            "a pending or accepted connection already exists for this pair".to_string(),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct UpdateConnectionStatusRequest {
    pub status: String,
}

enum UpdateOutcome {
    Updated {
        connection: Connection,
        notification: Notification,
    },
    NotFound,
    IllegalTransition { from: ConnectionStatus },
}

// Handler for PATCH /v0/connections/:id/status
pub async fn update_connection_status(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Json(body): Json<UpdateConnectionStatusRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let next = ConnectionStatus::parse(&body.status).ok_or((
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("unknown connection status {:?}", body.status),
    ))?;

    debug!("Connection {} -> {}", connection_id, next.as_str());

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let connections = ConnectionRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool);

        let connection = match connections.find(connection_id)? {
            Some(connection) => connection,
            None => return Ok(UpdateOutcome::NotFound),
        };
        let current = ConnectionStatus::parse(&connection.status)
            .ok_or_else(|| anyhow::anyhow!("corrupt connection status {:?}", connection.status))?;
        if !current.can_transition_to(next) {
            return Ok(UpdateOutcome::IllegalTransition { from: current });
        }

        let connection = connections
            .update_status(connection_id, next)?
            .ok_or_else(|| anyhow::anyhow!("connection vanished during status update"))?;
        let notification = notifications.create(NewNotification::new(
            connection.mentee_id,
            Some(connection.mentor_id),
            kinds::CONNECTION_UPDATED,
            format!("Your connection request is now {}", next.as_str()),
        ))?;
        Ok(UpdateOutcome::Updated {
            connection,
            notification,
        })
    })
    .await?;

    match outcome {
        UpdateOutcome::Updated {
            connection,
            notification,
        } => {
            state
                .realtime
                .publish(
                    connection.mentee_id,
                    RealtimeEvent::new(kinds::CONNECTION_UPDATED, json!(&connection)),
                )
                .await;
            state
                .realtime
                .publish(
                    connection.mentee_id,
                    RealtimeEvent::new("notification:new", json!(&notification)),
                )
                .await;
            Ok(Json(connection))
        }
        UpdateOutcome::NotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Connection with ID {} not found", connection_id),
        )),
        UpdateOutcome::IllegalTransition { from } => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "cannot transition connection from {} to {}",
                from.as_str(),
                next.as_str()
            ),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct ListConnectionsQuery {
    pub user_id: Uuid,
    pub status: Option<String>,
}

// Handler for GET /v0/connections
pub async fn list_connections(
    State(state): State<AppState>,
    Query(query): Query<ListConnectionsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let by_status = match &query.status {
        Some(raw) => Some(ConnectionStatus::parse(raw).ok_or((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("unknown connection status {:?}", raw),
        ))?),
        None => None,
    };

    let repo = ConnectionRepository::new(state.pool.clone());
    let user_id = query.user_id;
    let connections = run_blocking(move || repo.list_for_user(user_id, by_status)).await?;
    Ok(Json(connections))
}
