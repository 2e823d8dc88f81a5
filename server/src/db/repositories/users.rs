use crate::db::models::users::{NewUser, User};
use crate::db::postgres::schema::users::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: Arc<DBPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        UserRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_user: NewUser) -> Result<User> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(users)
            .values(&new_user)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(user = ?new_user, error = ?e, "Failed to insert User");
                anyhow::anyhow!("Failed to insert User: {}", e)
            })
    }

    pub fn find(&self, user_id: Uuid) -> Result<Option<User>> {
        let mut conn = self.get_conn()?;
        match users.find(user_id).first::<User>(&mut conn) {
            Ok(user) => Ok(Some(user)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(user_id = %user_id, error = ?e, "Failed to find User");
                Err(anyhow::anyhow!("Failed to find User: {}", e))
            }
        }
    }

    pub fn find_by_email(&self, user_email: &str) -> Result<Option<User>> {
        let mut conn = self.get_conn()?;
        match users.filter(email.eq(user_email)).first::<User>(&mut conn) {
            Ok(user) => Ok(Some(user)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(email = %user_email, error = ?e, "Failed to find User by email");
                Err(anyhow::anyhow!("Failed to find User by email: {}", e))
            }
        }
    }

    pub fn update(
        &self,
        user_id: Uuid,
        new_name: Option<String>,
        new_bio: Option<String>,
        new_image_url: Option<String>,
    ) -> Result<Option<User>> {
        let mut conn = self.get_conn()?;
        let result = diesel::update(users.find(user_id))
            .set((
                new_name.map(|v| name.eq(v)),
                new_bio.map(|v| bio.eq(v)),
                new_image_url.map(|v| image_url.eq(v)),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<User>(&mut conn);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(user_id = %user_id, error = ?e, "Failed to update User");
                Err(anyhow::anyhow!("Failed to update User: {}", e))
            }
        }
    }
}
