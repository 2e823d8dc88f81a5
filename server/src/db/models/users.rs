use crate::db::postgres::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two marketplace roles. Stored as text in the `role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Mentor,
    Mentee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Mentor => "MENTOR",
            UserRole::Mentee => "MENTEE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MENTOR" => Some(UserRole::Mentor),
            "MENTEE" => Some(UserRole::Mentee),
            _ => None,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_mentor(&self) -> bool {
        self.role == UserRole::Mentor.as_str()
    }

    pub fn is_mentee(&self) -> bool {
        self.role == UserRole::Mentee.as_str()
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(UserRole::parse("MENTOR"), Some(UserRole::Mentor));
        assert_eq!(UserRole::parse("MENTEE"), Some(UserRole::Mentee));
        assert_eq!(UserRole::Mentor.as_str(), "MENTOR");
        assert_eq!(UserRole::parse("mentor"), None);
        assert_eq!(UserRole::parse("ADMIN"), None);
    }
}
