//! PostgreSQL-backed implementation of the storage traits.
//!
//! Each call acquires a connection from the pool and delegates to the per-table repositories in
//! [`crate::db::handlers`]. Demographics bulk upserts run inside one transaction.

use crate::db::{
    errors::Result,
    handlers::{AdGroups, Campaigns, Demographics, Keywords, Users},
    models::{
        ad_groups::{AdGroup, AdGroupCreateDBRequest},
        campaigns::{Campaign, CampaignCreateDBRequest},
        demographics::{DemographicsPerformance, DemographicsSummary, DemographicsUpsert, UpsertOutcome, UserDemographics},
        keywords::{Keyword, KeywordCreateDBRequest},
    },
    store::{DemographicsStore, EntityStore},
};
use crate::types::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore<Campaign> for PostgresStore {
    async fn create(&self, user_id: Uuid, draft: &CampaignCreateDBRequest) -> Result<Campaign> {
        let mut conn = self.pool.acquire().await?;
        Campaigns::new(&mut conn).create(user_id, draft).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Campaign>> {
        let mut conn = self.pool.acquire().await?;
        Campaigns::new(&mut conn).get_by_id(id).await
    }

    async fn list_by_parent(&self, user_id: Uuid) -> Result<Vec<Campaign>> {
        let mut conn = self.pool.acquire().await?;
        Campaigns::new(&mut conn).list_by_user(user_id).await
    }

    async fn save(&self, campaign: &Campaign) -> Result<Campaign> {
        let mut conn = self.pool.acquire().await?;
        Campaigns::new(&mut conn).update_cpc(campaign).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Campaigns::new(&mut conn).soft_delete(id).await
    }
}

#[async_trait]
impl EntityStore<AdGroup> for PostgresStore {
    async fn create(&self, campaign_id: Uuid, draft: &AdGroupCreateDBRequest) -> Result<AdGroup> {
        let mut conn = self.pool.acquire().await?;
        AdGroups::new(&mut conn).create(campaign_id, draft).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<AdGroup>> {
        let mut conn = self.pool.acquire().await?;
        AdGroups::new(&mut conn).get_by_id(id).await
    }

    async fn list_by_parent(&self, campaign_id: Uuid) -> Result<Vec<AdGroup>> {
        let mut conn = self.pool.acquire().await?;
        AdGroups::new(&mut conn).list_by_campaign(campaign_id).await
    }

    async fn save(&self, ad_group: &AdGroup) -> Result<AdGroup> {
        let mut conn = self.pool.acquire().await?;
        AdGroups::new(&mut conn).update_cpc(ad_group).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        AdGroups::new(&mut conn).soft_delete(id).await
    }
}

#[async_trait]
impl EntityStore<Keyword> for PostgresStore {
    async fn create(&self, ad_group_id: Uuid, draft: &KeywordCreateDBRequest) -> Result<Keyword> {
        let mut conn = self.pool.acquire().await?;
        Keywords::new(&mut conn).create(ad_group_id, draft).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Keyword>> {
        let mut conn = self.pool.acquire().await?;
        Keywords::new(&mut conn).get_by_id(id).await
    }

    async fn list_by_parent(&self, ad_group_id: Uuid) -> Result<Vec<Keyword>> {
        let mut conn = self.pool.acquire().await?;
        Keywords::new(&mut conn).list_by_ad_group(ad_group_id).await
    }

    async fn save(&self, keyword: &Keyword) -> Result<Keyword> {
        let mut conn = self.pool.acquire().await?;
        Keywords::new(&mut conn).update_metrics(keyword).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Keywords::new(&mut conn).soft_delete(id).await
    }
}

#[async_trait]
impl DemographicsStore for PostgresStore {
    async fn get_by_user(&self, user_id: UserId) -> Result<Option<UserDemographics>> {
        let mut conn = self.pool.acquire().await?;
        Demographics::new(&mut conn).get_by_user(user_id).await
    }

    async fn upsert(&self, record: &DemographicsUpsert) -> Result<UserDemographics> {
        let mut conn = self.pool.acquire().await?;
        let row = Demographics::new(&mut conn).upsert(record).await?;
        Ok(row.record)
    }

    #[instrument(skip(self, records), fields(count = records.len()), err)]
    async fn bulk_upsert(&self, records: &[DemographicsUpsert]) -> Result<UpsertOutcome> {
        let mut outcome = UpsertOutcome::default();
        if records.is_empty() {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await?;
        {
            let mut repo = Demographics::new(&mut tx);
            for record in records {
                if repo.upsert(record).await?.inserted {
                    outcome.inserted += 1;
                } else {
                    outcome.updated += 1;
                }
            }
        }
        tx.commit().await?;

        Ok(outcome)
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserDemographics>> {
        let mut conn = self.pool.acquire().await?;
        Demographics::new(&mut conn).list_stale(cutoff).await
    }

    async fn list_user_ids(&self) -> Result<Vec<UserId>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).list_ids().await
    }

    async fn summary(&self) -> Result<DemographicsSummary> {
        let mut conn = self.pool.acquire().await?;
        Demographics::new(&mut conn).summary().await
    }

    async fn performance(&self) -> Result<Vec<DemographicsPerformance>> {
        let mut conn = self.pool.acquire().await?;
        Demographics::new(&mut conn).performance().await
    }
}
