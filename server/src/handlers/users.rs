use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::users::{NewUser, User, UserRole};
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::router::AppState;

#[derive(Deserialize, Debug)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

enum RegisterOutcome {
    Created(User),
    EmailTaken,
}

// Handler for POST /v0/users
pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_lowercase();
    if name.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "email is not valid".to_string()));
    }
    let role = UserRole::parse(&body.role).ok_or((
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("unknown role {:?}, expected MENTOR or MENTEE", body.role),
    ))?;

    debug!("Registering {} {}", role.as_str(), email);

    let repo = UserRepository::new(state.pool.clone());
    let outcome = run_blocking(move || {
        if repo.find_by_email(&email)?.is_some() {
            return Ok(RegisterOutcome::EmailTaken);
        }
        let user = repo.create(NewUser {
            id: Uuid::new_v4(),
            name,
            email,
            role: role.as_str().to_string(),
            bio: body.bio,
            image_url: body.image_url,
        })?;
        Ok(RegisterOutcome::Created(user))
    })
    .await?;

    match outcome {
        RegisterOutcome::Created(user) => Ok((StatusCode::CREATED, Json(user))),
        RegisterOutcome::EmailTaken => Err((
            StatusCode::CONFLICT,
            "a user with this email already exists".to_string(),
        )),
    }
}

// Handler for GET /v0/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!("Fetching user {}", user_id);

    let repo = UserRepository::new(state.pool.clone());
    let user = run_blocking(move || repo.find(user_id)).await?;

    match user {
        Some(user) => Ok(Json(user)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("User with ID {} not found", user_id),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

// Handler for PATCH /v0/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err((StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty".to_string()));
        }
    }

    debug!("Updating user {}", user_id);

    let repo = UserRepository::new(state.pool.clone());
    let user = run_blocking(move || repo.update(user_id, body.name, body.bio, body.image_url)).await?;

    match user {
        Some(user) => Ok(Json(user)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("User with ID {} not found", user_id),
        )),
    }
}
