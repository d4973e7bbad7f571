//! Database repository for users.

use crate::{
    db::{errors::Result, models::users::User},
    types::UserId,
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Register a user. Normally done by upstream provisioning; used here for seeding.
    #[instrument(skip(self), err)]
    pub async fn create(&mut self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>("INSERT INTO users (email) VALUES ($1) RETURNING id, email, created_at")
            .bind(email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn list_ids(&mut self) -> Result<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, UserId>("SELECT id FROM users ORDER BY created_at ASC, id ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(ids)
    }
}
