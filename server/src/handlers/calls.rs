//! Call signaling. The server holds no call state: it validates that the
//! parties share a connection, then relays the event to the other side.
//! The clients negotiate the actual media session among themselves.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::connections::{Connection, ConnectionStatus};
use crate::db::repositories::connections::ConnectionRepository;
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::realtime::RealtimeEvent;
use crate::router::AppState;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallMedia {
    Audio,
    Video,
}

#[derive(Deserialize, Debug)]
pub struct InitiateCallRequest {
    pub connection_id: Uuid,
    pub caller_id: Uuid,
    pub media: CallMedia,
}

#[derive(Serialize, Debug)]
pub struct InitiateCallResponse {
    pub call_id: Uuid,
}

enum InitiateOutcome {
    Ringing {
        callee: Uuid,
        caller_name: String,
        caller_image: Option<String>,
    },
    ConnectionNotFound,
    NotAParty,
    NotAccepted(ConnectionStatus),
}

// Handler for POST /v0/calls/initiate
pub async fn initiate_call(
    State(state): State<AppState>,
    Json(body): Json<InitiateCallRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!(
        "Call initiate on connection {} by {}",
        body.connection_id, body.caller_id
    );

    let pool = state.pool.clone();
    let connection_id = body.connection_id;
    let caller_id = body.caller_id;
    let outcome = run_blocking(move || {
        let connections = ConnectionRepository::new(pool.clone());
        let users = UserRepository::new(pool);

        let connection = match connections.find(connection_id)? {
            Some(connection) => connection,
            None => return Ok(InitiateOutcome::ConnectionNotFound),
        };
        let callee = match connection.other_party(caller_id) {
            Some(callee) => callee,
            None => return Ok(InitiateOutcome::NotAParty),
        };
        let status = ConnectionStatus::parse(&connection.status)
            .ok_or_else(|| anyhow::anyhow!("corrupt connection status {:?}", connection.status))?;
        if status != ConnectionStatus::Accepted {
            return Ok(InitiateOutcome::NotAccepted(status));
        }
        let caller = users.find(caller_id)?;
        Ok(InitiateOutcome::Ringing {
            callee,
            caller_name: caller.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
            caller_image: caller.and_then(|u| u.image_url),
        })
    })
    .await?;

    match outcome {
        InitiateOutcome::Ringing {
            callee,
            caller_name,
            caller_image,
        } => {
            let call_id = Uuid::new_v4();
            state
                .realtime
                .publish(
                    callee,
                    RealtimeEvent::new(
                        "call:incoming",
                        json!({
                            "call_id": call_id,
                            "connection_id": body.connection_id,
                            "media": body.media,
                            "caller": {
                                "id": body.caller_id,
                                "name": caller_name,
                                "image_url": caller_image,
                            },
                        }),
                    ),
                )
                .await;
            Ok((StatusCode::CREATED, Json(InitiateCallResponse { call_id })))
        }
        InitiateOutcome::ConnectionNotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Connection with ID {} not found", body.connection_id),
        )),
        InitiateOutcome::NotAParty => Err((
            StatusCode::FORBIDDEN,
            "caller_id is not a party to this connection".to_string(),
        )),
        InitiateOutcome::NotAccepted(status) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "calls require an ACCEPTED connection, this one is {}",
                status.as_str()
            ),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct CallSignalRequest {
    pub connection_id: Uuid,
    pub user_id: Uuid,
}

enum SignalOutcome {
    Peer(Uuid),
    ConnectionNotFound,
    NotAParty,
}

async fn relay_call_signal(
    state: AppState,
    call_id: Uuid,
    body: CallSignalRequest,
    event: &'static str,
) -> Result<StatusCode, (StatusCode, String)> {
    let pool = state.pool.clone();
    let connection_id = body.connection_id;
    let user_id = body.user_id;
    let outcome = run_blocking(move || {
        let connections = ConnectionRepository::new(pool);
        let connection: Option<Connection> = connections.find(connection_id)?;
        let connection = match connection {
            Some(connection) => connection,
            None => return Ok(SignalOutcome::ConnectionNotFound),
        };
        Ok(match connection.other_party(user_id) {
            Some(peer) => SignalOutcome::Peer(peer),
            None => SignalOutcome::NotAParty,
        })
    })
    .await?;

    match outcome {
        SignalOutcome::Peer(peer) => {
            state
                .realtime
                .publish(
                    peer,
                    RealtimeEvent::new(
                        event,
                        json!({
                            "call_id": call_id,
                            "connection_id": body.connection_id,
                            "by": body.user_id,
                        }),
                    ),
                )
                .await;
            Ok(StatusCode::NO_CONTENT)
        }
        SignalOutcome::ConnectionNotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Connection with ID {} not found", body.connection_id),
        )),
        SignalOutcome::NotAParty => Err((
            StatusCode::FORBIDDEN,
            "user_id is not a party to this connection".to_string(),
        )),
    }
}

// Handler for POST /v0/calls/:call_id/accept
pub async fn accept_call(
    State(state): State<AppState>,
    Path(call_id): Path<Uuid>,
    Json(body): Json<CallSignalRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    relay_call_signal(state, call_id, body, "call:accepted").await
}

// Handler for POST /v0/calls/:call_id/decline
pub async fn decline_call(
    State(state): State<AppState>,
    Path(call_id): Path<Uuid>,
    Json(body): Json<CallSignalRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    relay_call_signal(state, call_id, body, "call:declined").await
}

// Handler for POST /v0/calls/:call_id/end
pub async fn end_call(
    State(state): State<AppState>,
    Path(call_id): Path<Uuid>,
    Json(body): Json<CallSignalRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    relay_call_signal(state, call_id, body, "call:ended").await
}
