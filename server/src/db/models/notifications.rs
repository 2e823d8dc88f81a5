use crate::db::postgres::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// Notification kinds double as realtime event names on the relay.
pub mod kinds {
    pub const SESSION_REQUESTED: &str = "session:requested";
    pub const SESSION_UPDATED: &str = "session:updated";
    pub const CONNECTION_REQUESTED: &str = "connection:requested";
    pub const CONNECTION_UPDATED: &str = "connection:updated";
    pub const MESSAGE_NEW: &str = "message:new";
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: String,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: String,
    pub body: String,
}

impl NewNotification {
    pub fn new(recipient_id: Uuid, sender_id: Option<Uuid>, kind: &str, body: String) -> Self {
        NewNotification {
            id: Uuid::new_v4(),
            recipient_id,
            sender_id,
            kind: kind.to_string(),
            body,
        }
    }
}
