use crate::db::postgres::schema::connections;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mutual-consent relationship gating messaging and calls. Stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
    Removed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "PENDING",
            ConnectionStatus::Accepted => "ACCEPTED",
            ConnectionStatus::Rejected => "REJECTED",
            ConnectionStatus::Removed => "REMOVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ConnectionStatus::Pending),
            "ACCEPTED" => Some(ConnectionStatus::Accepted),
            "REJECTED" => Some(ConnectionStatus::Rejected),
            "REMOVED" => Some(ConnectionStatus::Removed),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: ConnectionStatus) -> bool {
        use ConnectionStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, Removed)
        )
    }

    /// A live pair blocks a duplicate request; rejected/removed history does not.
    pub fn blocks_new_request(&self) -> bool {
        matches!(self, ConnectionStatus::Pending | ConnectionStatus::Accepted)
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = connections)]
pub struct Connection {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.mentor_id == user_id || self.mentee_id == user_id
    }

    /// The counterpart of `user_id` in this connection, if they are a party.
    pub fn other_party(&self, user_id: Uuid) -> Option<Uuid> {
        if self.mentor_id == user_id {
            Some(self.mentee_id)
        } else if self.mentee_id == user_id {
            Some(self.mentor_id)
        } else {
            None
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = connections)]
pub struct NewConnection {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        use ConnectionStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Accepted.can_transition_to(Removed));

        assert!(!Pending.can_transition_to(Removed));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!Removed.can_transition_to(Pending));
    }

    #[test]
    fn other_party_resolution() {
        let conn = Connection {
            id: Uuid::new_v4(),
            mentor_id: Uuid::new_v4(),
            mentee_id: Uuid::new_v4(),
            status: ConnectionStatus::Accepted.as_str().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(conn.other_party(conn.mentor_id), Some(conn.mentee_id));
        assert_eq!(conn.other_party(conn.mentee_id), Some(conn.mentor_id));
        assert_eq!(conn.other_party(Uuid::new_v4()), None);
    }
}
