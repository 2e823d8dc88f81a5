use crate::db::models::connections::{Connection, ConnectionStatus, NewConnection};
use crate::db::postgres::schema::connections::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct ConnectionRepository {
    pool: Arc<DBPool>,
}

impl ConnectionRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        ConnectionRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_connection: NewConnection) -> Result<Connection> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(connections)
            .values(&new_connection)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(connection = ?new_connection, error = ?e, "Failed to insert Connection");
                anyhow::anyhow!("Failed to insert Connection: {}", e)
            })
    }

    pub fn find(&self, connection_id: Uuid) -> Result<Option<Connection>> {
        let mut conn = self.get_conn()?;
        match connections.find(connection_id).first::<Connection>(&mut conn) {
            Ok(connection) => Ok(Some(connection)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(connection_id = %connection_id, error = ?e, "Failed to find Connection");
                Err(anyhow::anyhow!("Failed to find Connection: {}", e))
            }
        }
    }

    /// The pending/accepted connection between a pair, if one exists.
    /// Rejected and removed rows are history and never block a new request.
    pub fn find_live_pair(&self, mentor: Uuid, mentee: Uuid) -> Result<Option<Connection>> {
        let mut conn = self.get_conn()?;
        let live = [
            ConnectionStatus::Pending.as_str(),
            ConnectionStatus::Accepted.as_str(),
        ];
        match connections
            .filter(mentor_id.eq(mentor))
            .filter(mentee_id.eq(mentee))
            .filter(status.eq_any(live))
            .first::<Connection>(&mut conn)
        {
            Ok(connection) => Ok(Some(connection)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(mentor_id = %mentor, mentee_id = %mentee, error = ?e, "Failed to find Connection pair");
                Err(anyhow::anyhow!("Failed to find Connection pair: {}", e))
            }
        }
    }

    pub fn list_for_user(&self, user: Uuid, by_status: Option<ConnectionStatus>) -> Result<Vec<Connection>> {
        let mut conn = self.get_conn()?;
        let mut query = connections
            .filter(mentor_id.eq(user).or(mentee_id.eq(user)))
            .into_boxed();
        if let Some(s) = by_status {
            query = query.filter(status.eq(s.as_str()));
        }
        query
            .order(created_at.desc())
            .load::<Connection>(&mut conn)
            .map_err(|e| {
                error!(user_id = %user, error = ?e, "Failed to list Connections");
                anyhow::anyhow!("Failed to list Connections: {}", e)
            })
    }

    pub fn update_status(&self, connection_id: Uuid, new_status: ConnectionStatus) -> Result<Option<Connection>> {
        let mut conn = self.get_conn()?;
        let result = diesel::update(connections.find(connection_id))
            .set((status.eq(new_status.as_str()), updated_at.eq(Utc::now())))
            .get_result::<Connection>(&mut conn);
        match result {
            Ok(connection) => Ok(Some(connection)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(connection_id = %connection_id, error = ?e, "Failed to update Connection status");
                Err(anyhow::anyhow!("Failed to update Connection status: {}", e))
            }
        }
    }
}
