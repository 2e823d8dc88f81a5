use crate::db::models::mentor_profiles::{MentorProfile, MentorProfileChanges, NewMentorProfile};
use crate::db::models::users::User;
use crate::db::postgres::schema::{mentor_profiles, users};
use crate::db::repositories::DBPool;
use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Browse/search filters for the mentor directory. All optional, ANDed.
#[derive(Debug, Clone, Default)]
pub struct MentorSearch {
    pub skill: Option<String>,
    pub query: Option<String>,
    pub location: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct MentorProfileRepository {
    pool: Arc<DBPool>,
}

impl MentorProfileRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        MentorProfileRepository { pool }
    }

    fn get_conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>> {
        self.pool.get().context("Failed to get DB connection")
    }

    pub fn create(&self, new_profile: NewMentorProfile) -> Result<MentorProfile> {
        let mut conn = self.get_conn()?;
        diesel::insert_into(mentor_profiles::table)
            .values(&new_profile)
            .get_result(&mut conn)
            .map_err(|e| {
                error!(profile = ?new_profile, error = ?e, "Failed to insert MentorProfile");
                anyhow::anyhow!("Failed to insert MentorProfile: {}", e)
            })
    }

    pub fn find_by_user_id(&self, owner_id: Uuid) -> Result<Option<MentorProfile>> {
        let mut conn = self.get_conn()?;
        match mentor_profiles::table
            .filter(mentor_profiles::user_id.eq(owner_id))
            .first::<MentorProfile>(&mut conn)
        {
            Ok(profile) => Ok(Some(profile)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(user_id = %owner_id, error = ?e, "Failed to find MentorProfile");
                Err(anyhow::anyhow!("Failed to find MentorProfile: {}", e))
            }
        }
    }

    pub fn update_by_user_id(
        &self,
        owner_id: Uuid,
        changes: MentorProfileChanges,
    ) -> Result<Option<MentorProfile>> {
        let mut conn = self.get_conn()?;
        let result = diesel::update(
            mentor_profiles::table.filter(mentor_profiles::user_id.eq(owner_id)),
        )
        .set(&changes)
        .get_result::<MentorProfile>(&mut conn);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(DieselError::NotFound) => Ok(None),
            Err(e) => {
                error!(user_id = %owner_id, error = ?e, "Failed to update MentorProfile");
                Err(anyhow::anyhow!("Failed to update MentorProfile: {}", e))
            }
        }
    }

    /// Directory search over profiles joined to their owners, newest first.
    pub fn search(&self, params: MentorSearch) -> Result<Vec<(MentorProfile, User)>> {
        let mut conn = self.get_conn()?;

        let mut query = mentor_profiles::table
            .inner_join(users::table)
            .select((MentorProfile::as_select(), User::as_select()))
            .into_boxed();

        if let Some(skill) = params.skill {
            query = query.filter(mentor_profiles::skills.contains(vec![skill]));
        }
        if let Some(q) = params.query {
            let pattern = format!("%{}%", q);
            query = query.filter(
                users::name
                    .ilike(pattern.clone())
                    .or(mentor_profiles::headline.ilike(pattern)),
            );
        }
        if let Some(loc) = params.location {
            query = query.filter(mentor_profiles::location.ilike(format!("%{}%", loc)));
        }

        query
            .order(mentor_profiles::created_at.desc())
            .limit(params.limit)
            .offset(params.offset)
            .load::<(MentorProfile, User)>(&mut conn)
            .map_err(|e| {
                error!(error = ?e, "Failed to search MentorProfiles");
                anyhow::anyhow!("Failed to search MentorProfiles: {}", e)
            })
    }
}
