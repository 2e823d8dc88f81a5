use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::mentor_profiles::{MentorProfile, MentorProfileChanges, NewMentorProfile};
use crate::db::models::users::User;
use crate::db::repositories::availability::AvailabilityRepository;
use crate::db::repositories::mentor_profiles::{MentorProfileRepository, MentorSearch};
use crate::db::repositories::users::UserRepository;
use crate::handlers::run_blocking;
use crate::router::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Debug)]
pub struct CreateProfileRequest {
    pub user_id: Uuid,
    pub headline: String,
    pub company: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub years_experience: i32,
    pub hourly_rate_cents: Option<i32>,
    pub location: Option<String>,
    pub about: Option<String>,
}

enum CreateProfileOutcome {
    Created(MentorProfile),
    UserNotFound,
    NotAMentor,
    AlreadyExists,
}

// Handler for POST /v0/profiles
pub async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if body.headline.trim().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "headline must not be empty".to_string()));
    }
    if body.years_experience < 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "years_experience must not be negative".to_string(),
        ));
    }

    debug!("Creating mentor profile for user {}", body.user_id);

    let pool = state.pool.clone();
    let outcome = run_blocking(move || {
        let users = UserRepository::new(pool.clone());
        let profiles = MentorProfileRepository::new(pool);

        let user = match users.find(body.user_id)? {
            Some(user) => user,
            None => return Ok(CreateProfileOutcome::UserNotFound),
        };
        if !user.is_mentor() {
            return Ok(CreateProfileOutcome::NotAMentor);
        }
        if profiles.find_by_user_id(body.user_id)?.is_some() {
            return Ok(CreateProfileOutcome::AlreadyExists);
        }

        let profile = profiles.create(NewMentorProfile {
            id: Uuid::new_v4(),
            user_id: body.user_id,
            headline: body.headline.trim().to_string(),
            company: body.company,
            skills: body.skills,
            years_experience: body.years_experience,
            hourly_rate_cents: body.hourly_rate_cents,
            location: body.location,
            about: body.about,
        })?;
        Ok(CreateProfileOutcome::Created(profile))
    })
    .await?;

    match outcome {
        CreateProfileOutcome::Created(profile) => Ok((StatusCode::CREATED, Json(profile))),
        CreateProfileOutcome::UserNotFound => Err((
            StatusCode::NOT_FOUND,
            "user not found".to_string(),
        )),
        CreateProfileOutcome::NotAMentor => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "only MENTOR users can have a mentor profile".to_string(),
        )),
        CreateProfileOutcome::AlreadyExists => Err((
            StatusCode::CONFLICT,
            "this user already has a mentor profile".to_string(),
        )),
    }
}

/// Profile-completion checklist: which fields a mentor has filled in, as the
/// profile page's progress indicator shows it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Completion {
    pub percent: u8,
    pub missing: Vec<&'static str>,
}

pub(crate) fn completion_score(user: &User, profile: &MentorProfile, has_availability: bool) -> Completion {
    fn filled_text(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    let checklist: [(&'static str, bool); 9] = [
        ("headline", !profile.headline.trim().is_empty()),
        ("skills", !profile.skills.is_empty()),
        ("years_experience", profile.years_experience > 0),
        ("hourly_rate_cents", profile.hourly_rate_cents.is_some()),
        ("location", filled_text(&profile.location)),
        ("about", filled_text(&profile.about)),
        ("bio", filled_text(&user.bio)),
        ("image_url", filled_text(&user.image_url)),
        ("availability", has_availability),
    ];

    let filled = checklist.iter().filter(|(_, ok)| *ok).count();
    let missing = checklist
        .iter()
        .filter(|(_, ok)| !*ok)
        .map(|(field, _)| *field)
        .collect();
    Completion {
        percent: (filled * 100 / checklist.len()) as u8,
        missing,
    }
}

#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub user: User,
    pub profile: MentorProfile,
    pub completion: Completion,
}

// Handler for GET /v0/profiles/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!("Fetching mentor profile for user {}", user_id);

    let pool = state.pool.clone();
    let found = run_blocking(move || {
        let users = UserRepository::new(pool.clone());
        let profiles = MentorProfileRepository::new(pool.clone());
        let availability = AvailabilityRepository::new(pool);

        let user = match users.find(user_id)? {
            Some(user) => user,
            None => return Ok(None),
        };
        let profile = match profiles.find_by_user_id(user_id)? {
            Some(profile) => profile,
            None => return Ok(None),
        };
        let declared_days = availability.list_for_profile(profile.id)?;
        let has_availability = declared_days.iter().any(|day| !day.slots.is_empty());
        Ok(Some((user, profile, has_availability)))
    })
    .await?;

    match found {
        Some((user, profile, has_availability)) => {
            let completion = completion_score(&user, &profile, has_availability);
            Ok(Json(ProfileResponse {
                user,
                profile,
                completion,
            }))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Mentor profile for user {} not found", user_id),
        )),
    }
}

#[derive(Deserialize, Debug)]
pub struct UpdateProfileRequest {
    pub headline: Option<String>,
    pub company: Option<String>,
    pub skills: Option<Vec<String>>,
    pub years_experience: Option<i32>,
    pub hourly_rate_cents: Option<i32>,
    pub location: Option<String>,
    pub about: Option<String>,
}

// Handler for PATCH /v0/profiles/:user_id
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(headline) = &body.headline {
        if headline.trim().is_empty() {
            return Err((StatusCode::UNPROCESSABLE_ENTITY, "headline must not be empty".to_string()));
        }
    }
    if body.years_experience.is_some_and(|y| y < 0) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "years_experience must not be negative".to_string(),
        ));
    }

    debug!("Updating mentor profile for user {}", user_id);

    let changes = MentorProfileChanges {
        headline: body.headline,
        company: body.company,
        skills: body.skills,
        years_experience: body.years_experience,
        hourly_rate_cents: body.hourly_rate_cents,
        location: body.location,
        about: body.about,
        updated_at: Some(Utc::now()),
    };

    let repo = MentorProfileRepository::new(state.pool.clone());
    let profile = run_blocking(move || repo.update_by_user_id(user_id, changes)).await?;

    match profile {
        Some(profile) => Ok(Json(profile)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Mentor profile for user {} not found", user_id),
        )),
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BrowseMentorsQuery {
    pub skill: Option<String>,
    pub q: Option<String>,
    pub location: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One row of the mentor directory.
#[derive(Serialize, Debug)]
pub struct MentorSummary {
    pub user_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub headline: String,
    pub company: Option<String>,
    pub skills: Vec<String>,
    pub years_experience: i32,
    pub hourly_rate_cents: Option<i32>,
    pub location: Option<String>,
}

// Handler for GET /v0/mentors
pub async fn browse_mentors(
    State(state): State<AppState>,
    Query(query): Query<BrowseMentorsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    debug!(
        skill = ?query.skill,
        q = ?query.q,
        location = ?query.location,
        "Browsing mentors"
    );

    let repo = MentorProfileRepository::new(state.pool.clone());
    let params = MentorSearch {
        skill: query.skill.filter(|s| !s.trim().is_empty()),
        query: query.q.filter(|s| !s.trim().is_empty()),
        location: query.location.filter(|s| !s.trim().is_empty()),
        limit,
        offset,
    };
    let rows = run_blocking(move || repo.search(params)).await?;

    let mentors: Vec<MentorSummary> = rows
        .into_iter()
        .map(|(profile, user)| MentorSummary {
            user_id: user.id,
            name: user.name,
            image_url: user.image_url,
            headline: profile.headline,
            company: profile.company,
            skills: profile.skills,
            years_experience: profile.years_experience,
            hourly_rate_cents: profile.hourly_rate_cents,
            location: profile.location,
        })
        .collect();
    Ok(Json(mentors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::users::UserRole;

    fn mentor_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Mentor.as_str().to_string(),
            bio: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn bare_profile(user_id: Uuid) -> MentorProfile {
        MentorProfile {
            id: Uuid::new_v4(),
            user_id,
            headline: "Staff engineer".to_string(),
            company: None,
            skills: vec![],
            years_experience: 0,
            hourly_rate_cents: None,
            location: None,
            about: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn minimal_profile_scores_one_of_nine() {
        let user = mentor_user();
        let profile = bare_profile(user.id);
        let completion = completion_score(&user, &profile, false);
        assert_eq!(completion.percent, 100 / 9);
        assert_eq!(completion.missing.len(), 8);
        assert!(completion.missing.contains(&"skills"));
        assert!(completion.missing.contains(&"availability"));
        assert!(!completion.missing.contains(&"headline"));
    }

    #[test]
    fn full_profile_scores_one_hundred() {
        let mut user = mentor_user();
        user.bio = Some("20 years of systems work".to_string());
        user.image_url = Some("https://img.example.com/ada.png".to_string());
        let mut profile = bare_profile(user.id);
        profile.skills = vec!["rust".to_string()];
        profile.years_experience = 12;
        profile.hourly_rate_cents = Some(15_000);
        profile.location = Some("Berlin".to_string());
        profile.about = Some("Ask me about distributed systems.".to_string());

        let completion = completion_score(&user, &profile, true);
        assert_eq!(completion.percent, 100);
        assert!(completion.missing.is_empty());
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        let mut user = mentor_user();
        user.bio = Some("   ".to_string());
        let profile = bare_profile(user.id);
        let completion = completion_score(&user, &profile, false);
        assert!(completion.missing.contains(&"bio"));
    }
}
