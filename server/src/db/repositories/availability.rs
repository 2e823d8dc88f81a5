use crate::db::models::availability::{Availability, NewAvailability};
use crate::db::postgres::schema::availability::dsl::*;
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: Arc<DBPool>,
}

impl AvailabilityRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        AvailabilityRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    /// Inserts or replaces one weekday's slot list for a profile.
    pub fn upsert(&self, new_row: NewAvailability) -> Result<Availability> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(availability)
            .values(&new_row)
            .on_conflict((mentor_profile_id, weekday))
            .do_update()
            .set((slots.eq(new_row.slots.clone()), updated_at.eq(Utc::now())))
            .get_result(&mut conn)
            .map_err(|e| {
                error!(row = ?new_row, error = ?e, "Failed to upsert Availability");
                anyhow::anyhow!("Failed to upsert Availability: {}", e)
            })
    }

    pub fn list_for_profile(&self, profile_id: Uuid) -> Result<Vec<Availability>> {
        let mut conn = self.get_conn()?;
        availability
            .filter(mentor_profile_id.eq(profile_id))
            .order(weekday.asc())
            .load::<Availability>(&mut conn)
            .map_err(|e| {
                error!(profile_id = %profile_id, error = ?e, "Failed to list Availability");
                anyhow::anyhow!("Failed to list Availability: {}", e)
            })
    }

    pub fn find_for_weekday(&self, profile_id: Uuid, day: i16) -> Result<Option<Availability>> {
        let mut conn = self.get_conn()?;
        match availability
            .filter(mentor_profile_id.eq(profile_id))
            .filter(weekday.eq(day))
            .first::<Availability>(&mut conn)
        {
            Ok(row) => Ok(Some(row)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(profile_id = %profile_id, day = day, error = ?e, "Failed to find Availability");
                Err(anyhow::anyhow!("Failed to find Availability: {}", e))
            }
        }
    }
}
