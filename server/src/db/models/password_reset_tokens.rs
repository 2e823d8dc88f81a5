use crate::db::postgres::schema::password_reset_tokens;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// Tokens are single-use and expire an hour after issue.
pub const TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = password_reset_tokens)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = password_reset_tokens)]
pub struct NewPasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl NewPasswordResetToken {
    pub fn issue(user_id: Uuid, now: DateTime<Utc>) -> Self {
        NewPasswordResetToken {
            id: Uuid::new_v4(),
            user_id,
            token: Uuid::new_v4().to_string(),
            expires_at: now + Duration::minutes(TOKEN_TTL_MINUTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_expires_after_an_hour() {
        let now = Utc::now();
        let new = NewPasswordResetToken::issue(Uuid::new_v4(), now);
        assert_eq!(new.expires_at, now + Duration::minutes(60));

        let row = PasswordResetToken {
            id: new.id,
            user_id: new.user_id,
            token: new.token.clone(),
            expires_at: new.expires_at,
            used: false,
            created_at: now,
        };
        assert!(!row.is_expired(now));
        assert!(!row.is_expired(now + Duration::minutes(59)));
        assert!(row.is_expired(now + Duration::minutes(60)));
    }
}
