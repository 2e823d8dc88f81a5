use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::db::repositories::DBPool;
use crate::handlers::{
    availability, calls, connections, messages, notifications, password_resets, profiles, sessions,
    users,
};
use crate::realtime::RealtimeClient;

// Define the application state struct
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DBPool>,
    pub realtime: RealtimeClient,
}

// Function to create the Axum router
pub fn create_router(pool: Arc<DBPool>, realtime: RealtimeClient) -> Router {
    let app_state = AppState { pool, realtime };

    Router::new()
        .route("/v0/users", post(users::register_user))
        .route(
            "/v0/users/:id",
            get(users::get_user).patch(users::update_user),
        )
        .route(
            "/v0/users/:id/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/v0/users/:id/notifications/read-all",
            post(notifications::mark_all_notifications_read),
        )
        .route("/v0/mentors", get(profiles::browse_mentors))
        .route("/v0/profiles", post(profiles::create_profile))
        .route(
            "/v0/profiles/:user_id",
            get(profiles::get_profile).patch(profiles::update_profile),
        )
        .route(
            "/v0/profiles/:user_id/availability",
            get(availability::get_availability),
        )
        .route(
            "/v0/profiles/:user_id/availability/:weekday",
            put(availability::set_availability),
        )
        .route(
            "/v0/sessions",
            post(sessions::book_session).get(sessions::list_sessions),
        )
        .route("/v0/sessions/:id", get(sessions::get_session))
        .route(
            "/v0/sessions/:id/status",
            patch(sessions::update_session_status),
        )
        .route(
            "/v0/connections",
            post(connections::request_connection).get(connections::list_connections),
        )
        .route(
            "/v0/connections/:id/status",
            patch(connections::update_connection_status),
        )
        .route(
            "/v0/connections/:id/messages",
            post(messages::send_message).get(messages::list_messages),
        )
        .route(
            "/v0/connections/:id/messages/read",
            post(messages::mark_messages_read),
        )
        .route(
            "/v0/notifications/:id/read",
            post(notifications::mark_notification_read),
        )
        .route("/v0/calls/initiate", post(calls::initiate_call))
        .route("/v0/calls/:call_id/accept", post(calls::accept_call))
        .route("/v0/calls/:call_id/decline", post(calls::decline_call))
        .route("/v0/calls/:call_id/end", post(calls::end_call))
        .route(
            "/v0/password-resets",
            post(password_resets::issue_reset_token),
        )
        .route(
            "/v0/password-resets/consume",
            post(password_resets::consume_reset_token),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
