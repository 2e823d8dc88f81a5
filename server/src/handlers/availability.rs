use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::availability::{Availability, NewAvailability};
use crate::db::repositories::availability::AvailabilityRepository;
use crate::db::repositories::mentor_profiles::MentorProfileRepository;
use crate::handlers::run_blocking;
use crate::router::AppState;
use crate::scheduling;

#[derive(Deserialize, Debug)]
pub struct SetAvailabilityRequest {
    pub slots: Vec<String>,
}

enum UpsertOutcome {
    Saved(Availability),
    ProfileNotFound,
}

// Handler for PUT /v0/profiles/:user_id/availability/:weekday
pub async fn set_availability(
    State(state): State<AppState>,
    Path((user_id, weekday)): Path<(Uuid, i16)>,
    Json(body): Json<SetAvailabilityRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !(0..=6).contains(&weekday) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("weekday {} is out of range (0 = Monday .. 6 = Sunday)", weekday),
        ));
    }
    // Validate the whole day before touching the database.
    if let Err(e) = scheduling::parse_day_slots(&body.slots) {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    debug!("Setting availability for user {} weekday {}", user_id, weekday);

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let profiles = MentorProfileRepository::new(pool.clone());
        let availability = AvailabilityRepository::new(pool);

        let profile = match profiles.find_by_user_id(user_id)? {
            Some(profile) => profile,
            None => return Ok(UpsertOutcome::ProfileNotFound),
        };
        let saved = availability.upsert(NewAvailability {
            id: Uuid::new_v4(),
            mentor_profile_id: profile.id,
            weekday,
            slots: body.slots,
        })?;
        Ok(UpsertOutcome::Saved(saved))
    })
    .await?;

    match outcome {
        UpsertOutcome::Saved(saved) => Ok(Json(saved)),
        UpsertOutcome::ProfileNotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Mentor profile for user {} not found", user_id),
        )),
    }
}

// Handler for GET /v0/profiles/:user_id/availability
pub async fn get_availability(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!("Fetching availability for user {}", user_id);

    let pool = state.pool.clone();
    let week = run_blocking(move || {
        let profiles = MentorProfileRepository::new(pool.clone());
        let availability = AvailabilityRepository::new(pool);

        let profile = match profiles.find_by_user_id(user_id)? {
            Some(profile) => profile,
            None => return Ok(None),
        };
        availability.list_for_profile(profile.id).map(Some)
    })
    .await?;

    match week {
        Some(days) => Ok(Json(days)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Mentor profile for user {} not found", user_id),
        )),
    }
}
