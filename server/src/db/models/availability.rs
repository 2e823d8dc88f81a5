use crate::db::postgres::schema::availability;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// One weekday's declared open slots for a mentor profile. `weekday` is
/// 0 = Monday through 6 = Sunday; `slots` holds `"HH:MM-HH:MM"` strings.
#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = availability)]
pub struct Availability {
    pub id: Uuid,
    pub mentor_profile_id: Uuid,
    pub weekday: i16,
    pub slots: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = availability)]
pub struct NewAvailability {
    pub id: Uuid,
    pub mentor_profile_id: Uuid,
    pub weekday: i16,
    pub slots: Vec<String>,
}
