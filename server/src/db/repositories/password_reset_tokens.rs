use crate::db::models::password_reset_tokens::{NewPasswordResetToken, PasswordResetToken};
use crate::db::postgres::schema::password_reset_tokens::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct PasswordResetTokenRepository {
    pool: Arc<DBPool>,
}

impl PasswordResetTokenRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        PasswordResetTokenRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_token: NewPasswordResetToken) -> Result<PasswordResetToken> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(password_reset_tokens)
            .values(&new_token)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(user_id = %new_token.user_id, error = ?e, "Failed to insert PasswordResetToken");
                anyhow::anyhow!("Failed to insert PasswordResetToken: {}", e)
            })
    }

    pub fn find_by_token(&self, raw_token: &str) -> Result<Option<PasswordResetToken>> {
        let mut conn = self.get_conn()?;
        match password_reset_tokens
            .filter(token.eq(raw_token))
            .first::<PasswordResetToken>(&mut conn)
        {
            Ok(row) => Ok(Some(row)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(error = ?e, "Failed to find PasswordResetToken");
                Err(anyhow::anyhow!("Failed to find PasswordResetToken: {}", e))
            }
        }
    }

    pub fn mark_used(&self, token_id: Uuid) -> Result<()> {
        let mut conn = self.get_conn()?;
        diesel::update(password_reset_tokens.find(token_id))
            .set(used.eq(true))
            .execute(&mut conn)
            .map(|_| ())
            .map_err(|e| {
                error!(token_id = %token_id, error = ?e, "Failed to mark PasswordResetToken used");
                anyhow::anyhow!("Failed to mark PasswordResetToken used: {}", e)
            })
    }
}
