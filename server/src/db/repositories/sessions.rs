use crate::db::models::sessions::{NewSession, Session, SessionStatus};
use crate::db::postgres::schema::sessions::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionRepository {
    pool: Arc<DBPool>,
}

impl SessionRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        SessionRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_session: NewSession) -> Result<Session> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(sessions)
            .values(&new_session)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(session = ?new_session, error = ?e, "Failed to insert Session");
                anyhow::anyhow!("Failed to insert Session: {}", e)
            })
    }

    pub fn find(&self, session_id: Uuid) -> Result<Option<Session>> {
        let mut conn = self.get_conn()?;
        match sessions.find(session_id).first::<Session>(&mut conn) {
            Ok(session) => Ok(Some(session)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to find Session");
                Err(anyhow::anyhow!("Failed to find Session: {}", e))
            }
        }
    }

    /// Live (pending/confirmed) bookings of `mentor` colliding with
    /// `[new_start, new_end)`. Two intervals collide iff each starts before
    /// the other ends.
    pub fn find_overlapping(
        &self,
        mentor: Uuid,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<Vec<Session>> {
        let mut conn = self.get_conn()?;
        let live = [
            SessionStatus::Pending.as_str(),
            SessionStatus::Confirmed.as_str(),
        ];
        sessions
            .filter(mentor_id.eq(mentor))
            .filter(status.eq_any(live))
            .filter(start_time.lt(new_end))
            .filter(end_time.gt(new_start))
            .load::<Session>(&mut conn)
            .map_err(|e| {
                error!(mentor_id = %mentor, error = ?e, "Failed to check Session overlap");
                anyhow::anyhow!("Failed to check Session overlap: {}", e)
            })
    }

    pub fn list_for_mentor(&self, mentor: Uuid, by_status: Option<SessionStatus>) -> Result<Vec<Session>> {
        let mut conn = self.get_conn()?;
        let mut query = sessions.filter(mentor_id.eq(mentor)).into_boxed();
        if let Some(s) = by_status {
            query = query.filter(status.eq(s.as_str()));
        }
        query
            .order(start_time.desc())
            .load::<Session>(&mut conn)
            .map_err(|e| {
                error!(mentor_id = %mentor, error = ?e, "Failed to list Sessions for mentor");
                anyhow::anyhow!("Failed to list Sessions for mentor: {}", e)
            })
    }

    pub fn list_for_mentee(&self, mentee: Uuid, by_status: Option<SessionStatus>) -> Result<Vec<Session>> {
        let mut conn = self.get_conn()?;
        let mut query = sessions.filter(mentee_id.eq(mentee)).into_boxed();
        if let Some(s) = by_status {
            query = query.filter(status.eq(s.as_str()));
        }
        query
            .order(start_time.desc())
            .load::<Session>(&mut conn)
            .map_err(|e| {
                error!(mentee_id = %mentee, error = ?e, "Failed to list Sessions for mentee");
                anyhow::anyhow!("Failed to list Sessions for mentee: {}", e)
            })
    }

    pub fn update_status(&self, session_id: Uuid, new_status: SessionStatus) -> Result<Option<Session>> {
        let mut conn = self.get_conn()?;
        let result = diesel::update(sessions.find(session_id))
            .set((status.eq(new_status.as_str()), updated_at.eq(Utc::now())))
            .get_result::<Session>(&mut conn);
        match result {
            Ok(session) => Ok(Some(session)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to update Session status");
                Err(anyhow::anyhow!("Failed to update Session status: {}", e))
            }
        }
    }
}
