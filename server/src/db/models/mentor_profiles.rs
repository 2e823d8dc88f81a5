use crate::db::postgres::schema::mentor_profiles;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = mentor_profiles)]
pub struct MentorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headline: String,
    pub company: Option<String>,
    pub skills: Vec<String>,
    pub years_experience: i32,
    pub hourly_rate_cents: Option<i32>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = mentor_profiles)]
pub struct NewMentorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headline: String,
    pub company: Option<String>,
    pub skills: Vec<String>,
    pub years_experience: i32,
    pub hourly_rate_cents: Option<i32>,
    pub location: Option<String>,
    pub about: Option<String>,
}

/// Column-wise partial update, applied with `AsChangeset`. `None` fields are
/// left untouched.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = mentor_profiles)]
pub struct MentorProfileChanges {
    pub headline: Option<String>,
    pub company: Option<String>,
    pub skills: Option<Vec<String>>,
    pub years_experience: Option<i32>,
    pub hourly_rate_cents: Option<i32>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
