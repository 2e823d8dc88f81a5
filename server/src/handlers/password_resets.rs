//! Password-reset token lifecycle. Credential storage lives with the external
//! auth provider; this service only issues, verifies, and consumes the
//! single-use tokens. Mail delivery is likewise external, so the issue
//! endpoint hands the token back to the caller.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::password_reset_tokens::NewPasswordResetToken;
use crate::db::repositories::password_reset_tokens::PasswordResetTokenRepository;
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::router::AppState;

#[derive(Deserialize, Debug)]
pub struct IssueResetRequest {
    pub email: String,
}

#[derive(Serialize, Debug)]
pub struct IssueResetResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// Handler for POST /v0/password-resets
pub async fn issue_reset_token(
    State(state): State<AppState>,
    Json(body): Json<IssueResetRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let email = body.email.trim().to_lowercase();
    debug!("Password reset requested for {}", email);

    let pool = state.pool.clone();
    let issued = run_blocking(move || {
        let users = UserRepository::new(pool.clone());
        let tokens = PasswordResetTokenRepository::new(pool);

        let user = match users.find_by_email(&email)? {
            Some(user) => user,
            None => return Ok(None),
        };
        tokens
            .create(NewPasswordResetToken::issue(user.id, Utc::now()))
            .map(Some)
    })
    .await?;

    match issued {
        Some(row) => Ok((
            StatusCode::CREATED,
            Json(IssueResetResponse {
                token: row.token,
                expires_at: row.expires_at,
            }),
        )),
        None => Err((
            StatusCode::NOT_FOUND,
            "no user with this email".to_string(),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct ConsumeResetRequest {
    pub token: String,
}

#[derive(Serialize, Debug)]
pub struct ConsumeResetResponse {
    pub user_id: Uuid,
}

enum ConsumeOutcome {
    Consumed(Uuid),
    Unknown,
    Spent,
}

// Handler for POST /v0/password-resets/consume
pub async fn consume_reset_token(
    State(state): State<AppState>,
    Json(body): Json<ConsumeResetRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let repo = PasswordResetTokenRepository::new(state.pool.clone());
    let outcome = run_blocking(move || {
        let row = match repo.find_by_token(body.token.trim())? {
            Some(row) => row,
            None => return Ok(ConsumeOutcome::Unknown),
        };
        if row.used || row.is_expired(Utc::now()) {
            return Ok(ConsumeOutcome::Spent);
        }
        repo.mark_used(row.id)?;
        Ok(ConsumeOutcome::Consumed(row.user_id))
    })
    .await?;

    match outcome {
        ConsumeOutcome::Consumed(user_id) => Ok(Json(ConsumeResetResponse { user_id })),
        ConsumeOutcome::Unknown => Err((
            StatusCode::NOT_FOUND,
            "unknown reset token".to_string(),
        )),
        ConsumeOutcome::Spent => Err((
            StatusCode::GONE,
            "reset token already used or expired".to_string(),
        )),
    }
}
