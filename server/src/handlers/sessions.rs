use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::notifications::{kinds, NewNotification, Notification};
use crate::db::models::sessions::{NewSession, Session, SessionStatus};
use crate::db::repositories::availability::AvailabilityRepository;
use crate::db::repositories::mentor_profiles::MentorProfileRepository;
use crate::db::repositories::notifications::NotificationRepository;
use crate::db::repositories::sessions::SessionRepository;
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::realtime::RealtimeEvent;
use crate::router::AppState;
use crate::scheduling;

#[derive(Deserialize, Debug)]
pub struct BookSessionRequest {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub topic: Option<String>,
}

enum BookOutcome {
    Booked {
        session: Session,
        notification: Notification,
    },
    MenteeNotFound,
    MentorNotFound,
    OutsideAvailability,
    Conflict,
}

// Handler for POST /v0/sessions
pub async fn book_session(
    State(state): State<AppState>,
    Json(body): Json<BookSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if body.start_time >= body.end_time {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "start_time must be before end_time".to_string(),
        ));
    }
    if body.start_time <= Utc::now() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "start_time must be in the future".to_string(),
        ));
    }

    debug!(
        "Booking session: mentor {} mentee {} at {}",
        body.mentor_id, body.mentee_id, body.start_time
    );

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let users = UserRepository::new(pool.clone());
        let profiles = MentorProfileRepository::new(pool.clone());
        let availability = AvailabilityRepository::new(pool.clone());
        let sessions = SessionRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool);

        let mentee = match users.find(body.mentee_id)? {
            Some(user) => user,
            None => return Ok(BookOutcome::MenteeNotFound),
        };
        if users.find(body.mentor_id)?.is_none() {
            return Ok(BookOutcome::MentorNotFound);
        }
        let profile = match profiles.find_by_user_id(body.mentor_id)? {
            Some(profile) => profile,
            None => return Ok(BookOutcome::MentorNotFound),
        };

        // The requested interval must sit inside one declared slot on that
        // weekday; a booking never spans midnight.
        if body.start_time.date_naive() != body.end_time.date_naive() {
            return Ok(BookOutcome::OutsideAvailability);
        }
        let weekday = scheduling::weekday_index(body.start_time);
        let declared = match availability.find_for_weekday(profile.id, weekday)? {
            Some(day) => scheduling::parse_day_slots(&day.slots)?,
            None => return Ok(BookOutcome::OutsideAvailability),
        };
        if !scheduling::slots_cover(&declared, body.start_time.time(), body.end_time.time()) {
            return Ok(BookOutcome::OutsideAvailability);
        }

        // The overlapping-interval check against the mentor's live bookings.
        if !sessions
            .find_overlapping(body.mentor_id, body.start_time, body.end_time)?
            .is_empty()
        {
            return Ok(BookOutcome::Conflict);
        }

        let session = sessions.create(NewSession {
            id: Uuid::new_v4(),
            mentor_id: body.mentor_id,
            mentee_id: body.mentee_id,
            start_time: body.start_time,
            end_time: body.end_time,
            status: SessionStatus::Pending.as_str().to_string(),
            topic: body.topic,
        })?;
        let notification = notifications.create(NewNotification::new(
            body.mentor_id,
            Some(body.mentee_id),
            kinds::SESSION_REQUESTED,
            format!("{} requested a session", mentee.name),
        ))?;
        Ok(BookOutcome::Booked {
            session,
            notification,
        })
    })
    .await?;

    match outcome {
        BookOutcome::Booked {
            session,
            notification,
        } => {
            state
                .realtime
                .publish(
                    session.mentor_id,
                    RealtimeEvent::new(kinds::SESSION_REQUESTED, json!(&session)),
                )
                .await;
            state
                .realtime
                .publish(
                    session.mentor_id,
                    RealtimeEvent::new("notification:new", json!(&notification)),
                )
                .await;
            Ok((StatusCode::CREATED, Json(session)))
        }
        BookOutcome::MenteeNotFound => Err((
            StatusCode::NOT_FOUND,
            "mentee not found".to_string(),
        )),
        BookOutcome::MentorNotFound => Err((
            StatusCode::NOT_FOUND,
            "mentor with a mentor profile not found".to_string(),
        )),
        BookOutcome::OutsideAvailability => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "requested time is outside the mentor's declared availability".to_string(),
        )),
        BookOutcome::Conflict => Err((
            StatusCode::CONFLICT,
            "the mentor already has a booking overlapping this time".to_string(),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct ListSessionsQuery {
    pub mentor_id: Option<Uuid>,
    pub mentee_id: Option<Uuid>,
    pub status: Option<String>,
}

// Handler for GET /v0/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let by_status = match &query.status {
        Some(raw) => Some(SessionStatus::parse(raw).ok_or((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("unknown session status {:?}", raw),
        ))?),
        None => None,
    };

    let repo = SessionRepository::new(state.pool.clone());
    let sessions = match (query.mentor_id, query.mentee_id) {
        (Some(mentor), None) => run_blocking(move || repo.list_for_mentor(mentor, by_status)).await?,
        (None, Some(mentee)) => run_blocking(move || repo.list_for_mentee(mentee, by_status)).await?,
        _ => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "provide exactly one of mentor_id or mentee_id".to_string(),
            ))
        }
    };
    Ok(Json(sessions))
}

// Handler for GET /v0/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let repo = SessionRepository::new(state.pool.clone());
    let session = run_blocking(move || repo.find(session_id)).await?;

    match session {
        Some(session) => Ok(Json(session)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Session with ID {} not found", session_id),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct UpdateSessionStatusRequest {
    pub status: String,
    /// Which party is making the change; the counterpart gets notified.
    pub actor_id: Uuid,
}

enum UpdateStatusOutcome {
    Updated {
        session: Session,
        notification: Notification,
        counterpart: Uuid,
    },
    NotFound,
    NotAParty,
    IllegalTransition { from: SessionStatus },
}

// Handler for PATCH /v0/sessions/:id/status
pub async fn update_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<UpdateSessionStatusRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let next = SessionStatus::parse(&body.status).ok_or((
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("unknown session status {:?}", body.status),
    ))?;

    debug!("Session {} -> {}", session_id, next.as_str());

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let sessions = SessionRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool.clone());
        let users = UserRepository::new(pool);

        let session = match sessions.find(session_id)? {
            Some(session) => session,
            None => return Ok(UpdateStatusOutcome::NotFound),
        };
        let counterpart = if body.actor_id == session.mentor_id {
            session.mentee_id
        } else if body.actor_id == session.mentee_id {
            session.mentor_id
        } else {
            return Ok(UpdateStatusOutcome::NotAParty);
        };
        let current = SessionStatus::parse(&session.status)
            .ok_or_else(|| anyhow::anyhow!("corrupt session status {:?}", session.status))?;
        if !current.can_transition_to(next) {
            return Ok(UpdateStatusOutcome::IllegalTransition { from: current });
        }

        let session = sessions
            .update_status(session_id, next)?
            .ok_or_else(|| anyhow::anyhow!("session vanished during status update"))?;
        let actor_name = users
            .find(body.actor_id)?
            .map(|u| u.name)
            .unwrap_or_else(|| "The other party".to_string());
        let notification = notifications.create(NewNotification::new(
            counterpart,
            Some(body.actor_id),
            kinds::SESSION_UPDATED,
            format!("{} marked your session {}", actor_name, next.as_str()),
        ))?;
        Ok(UpdateStatusOutcome::Updated {
            session,
            notification,
            counterpart,
        })
    })
    .await?;

    match outcome {
        UpdateStatusOutcome::Updated {
            session,
            notification,
            counterpart,
        } => {
            state
                .realtime
                .publish(
                    counterpart,
                    RealtimeEvent::new(kinds::SESSION_UPDATED, json!(&session)),
                )
                .await;
            state
                .realtime
                .publish(
                    counterpart,
                    RealtimeEvent::new("notification:new", json!(&notification)),
                )
                .await;
            Ok(Json(session))
        }
        UpdateStatusOutcome::NotFound => Err((
            StatusCode::NOT_FOUND,
            format!("Session with ID {} not found", session_id),
        )),
        UpdateStatusOutcome::NotAParty => Err((
            StatusCode::FORBIDDEN,
            "actor_id is not a party to this session".to_string(),
        )),
        UpdateStatusOutcome::IllegalTransition { from } => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "cannot transition session from {} to {}",
                from.as_str(),
                next.as_str()
            ),
        )),
    }
}
