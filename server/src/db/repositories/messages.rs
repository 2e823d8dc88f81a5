use crate::db::models::messages::{Message, NewMessage};
use crate::db::postgres::schema::messages::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageRepository {
    pool: Arc<DBPool>,
}

impl MessageRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        MessageRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_message: NewMessage) -> Result<Message> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(messages)
            .values(&new_message)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(message = ?new_message, error = ?e, "Failed to insert Message");
                anyhow::anyhow!("Failed to insert Message: {}", e)
            })
    }

    /// Newest-first page, keyset-paginated on `created_at`.
    pub fn list_for_connection(
        &self,
        conversation: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>> {
        let mut conn = self.get_conn()?;
        let mut query = messages.filter(connection_id.eq(conversation)).into_boxed();
        if let Some(cursor) = before {
            query = query.filter(created_at.lt(cursor));
        }
        query
            .order(created_at.desc())
            .limit(limit)
            .load::<Message>(&mut conn)
            .map_err(|e| {
                error!(connection_id = %conversation, error = ?e, "Failed to list Messages");
                anyhow::anyhow!("Failed to list Messages: {}", e)
            })
    }

    /// Marks everything addressed to `reader` in this conversation as read.
    /// Returns the number of rows touched.
    pub fn mark_read(&self, conversation: Uuid, reader: Uuid) -> Result<usize> {
        let mut conn = self.get_conn()?;
        diesel::update(
            messages
                .filter(connection_id.eq(conversation))
                .filter(sender_id.ne(reader))
                .filter(read_at.is_null()),
        )
        .set(read_at.eq(Utc::now()))
        .execute(&mut conn)
        .map_err(|e| {
            error!(connection_id = %conversation, reader = %reader, error = ?e, "Failed to mark Messages read");
            anyhow::anyhow!("Failed to mark Messages read: {}", e)
        })
    }
}
