// Users and the activity log

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::rows::{ActivityRow, UserRow};
use crate::db::DieselPool;
use crate::models::{Activity, User};
use crate::repositories::{ActivityRepository, Result, UserRepository};
use crate::schema::{activities, users};

pub struct PgUserRepository {
    pool: DieselPool,
}

impl PgUserRepository {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: User) -> Result<User> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(UserRow::from(&user))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await?
            .try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .find(id)
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()?
            .map(User::try_from)
            .transpose()
    }
}

pub struct PgActivityRepository {
    pool: DieselPool,
}

impl PgActivityRepository {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn record(&self, activity: Activity) -> Result<()> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(activities::table)
            .values(ActivityRow::from(activity))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn for_entity(&self, entity_id: &str) -> Result<Vec<Activity>> {
        let mut conn = self.pool.get().await?;

        let rows = activities::table
            .filter(activities::entity_id.eq(entity_id))
            .order(activities::created_at.desc())
            .select(ActivityRow::as_select())
            .load::<ActivityRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Activity::from).collect())
    }
}
