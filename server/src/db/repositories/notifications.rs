use crate::db::models::notifications::{NewNotification, Notification};
use crate::db::postgres::schema::notifications::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: Arc<DBPool>,
}

impl NotificationRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        NotificationRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_notification: NewNotification) -> Result<Notification> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(notifications)
            .values(&new_notification)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(notification = ?new_notification, error = ?e, "Failed to insert Notification");
                anyhow::anyhow!("Failed to insert Notification: {}", e)
            })
    }

    pub fn list_for_recipient(&self, recipient: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        let mut conn = self.get_conn()?;
        let mut query = notifications.filter(recipient_id.eq(recipient)).into_boxed();
        if unread_only {
            query = query.filter(read_at.is_null());
        }
        query
            .order(created_at.desc())
            .load::<Notification>(&mut conn)
            .map_err(|e| {
                error!(recipient_id = %recipient, error = ?e, "Failed to list Notifications");
                anyhow::anyhow!("Failed to list Notifications: {}", e)
            })
    }

    /// Idempotent: a second read of the same notification keeps the original
    /// `read_at`.
    pub fn mark_read(&self, notification_id: Uuid) -> Result<Option<Notification>> {
        let mut conn = self.get_conn()?;
        let result = diesel::update(
            notifications
                .find(notification_id)
                .filter(read_at.is_null()),
        )
        .set(read_at.eq(Utc::now()))
        .get_result::<Notification>(&mut conn);
        match result {
            Ok(notification) => Ok(Some(notification)),
            // Either absent or already read; let the caller disambiguate.
            Err(DieselError::NotFound) => match notifications.find(notification_id).first::<Notification>(&mut conn) {
                Ok(notification) => Ok(Some(notification)),
                Err(DieselError::NotFound) => Ok(None),
                Err(e) => {
                    error!(notification_id = %notification_id, error = ?e, "Failed to re-fetch Notification");
                    Err(anyhow::anyhow!("Failed to re-fetch Notification: {}", e))
                }
            },
            Err(e) => {
                error!(notification_id = %notification_id, error = ?e, "Failed to mark Notification read");
                Err(anyhow::anyhow!("Failed to mark Notification read: {}", e))
            }
        }
    }

    pub fn mark_all_read(&self, recipient: Uuid) -> Result<usize> {
        let mut conn = self.get_conn()?;
        diesel::update(
            notifications
                .filter(recipient_id.eq(recipient))
                .filter(read_at.is_null()),
        )
        .set(read_at.eq(Utc::now()))
        .execute(&mut conn)
        .map_err(|e| {
            error!(recipient_id = %recipient, error = ?e, "Failed to mark Notifications read");
            anyhow::anyhow!("Failed to mark Notifications read: {}", e)
        })
    }
}
