use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::db::repositories::notifications::NotificationRepository;
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::router::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

// Handler for GET /v0/users/:id/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!("Fetching notifications for user {}", user_id);

    let pool = state.pool.clone();
    let found = run_blocking(move || {
        let users = UserRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool);

        if users.find(user_id)?.is_none() {
            return Ok(None);
        }
        notifications
            .list_for_recipient(user_id, query.unread_only)
            .map(Some)
    })
    .await?;

    match found {
        Some(notifications) => Ok(Json(notifications)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("User with ID {} not found", user_id),
        )),
    }
}

// Handler for POST /v0/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let repo = NotificationRepository::new(state.pool.clone());
    let notification = run_blocking(move || repo.mark_read(notification_id)).await?;

    match notification {
        Some(notification) => Ok(Json(notification)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Notification with ID {} not found", notification_id),
        )),
    }
}

#[derive(Serialize, Debug)]
pub struct ReadAllResponse {
    pub updated: usize,
}

// Handler for POST /v0/users/:id/notifications/read-all
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let repo = NotificationRepository::new(state.pool.clone());
    let updated = run_blocking(move || repo.mark_all_read(user_id)).await?;
    Ok(Json(ReadAllResponse { updated }))
}
