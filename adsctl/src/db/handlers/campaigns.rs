//! Database repository for campaigns.

use crate::{
    db::{
        errors::{DbError, Result},
        models::campaigns::{Campaign, CampaignCreateDBRequest},
    },
    types::{CampaignId, UserId, abbrev_uuid},
};
use sqlx::PgConnection;
use tracing::instrument;

const CAMPAIGN_COLUMNS: &str = "id, user_id, name, status, google_ads_campaign_id, cpc, average_cpc, max_cpc, \
     click_through_rate, conversion_rate, roas, created_at, updated_at, deleted_at";

pub struct Campaigns<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Campaigns<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&user_id), name = %request.name), err)]
    pub async fn create(&mut self, user_id: UserId, request: &CampaignCreateDBRequest) -> Result<Campaign> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            INSERT INTO campaigns (
                user_id, name, status, google_ads_campaign_id, cpc, average_cpc, max_cpc,
                click_through_rate, conversion_rate, roas
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.status)
        .bind(&request.google_ads_campaign_id)
        .bind(request.cpc.cpc)
        .bind(request.cpc.average_cpc)
        .bind(request.cpc.max_cpc)
        .bind(request.click_through_rate)
        .bind(request.conversion_rate)
        .bind(request.roas)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(campaign)
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: CampaignId) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(campaign)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_by_user(&mut self, user_id: UserId) -> Result<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS}
            FROM campaigns
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(campaigns)
    }

    /// Overwrite the CPC triple of a live campaign
    #[instrument(skip(self, campaign), fields(campaign_id = %abbrev_uuid(&campaign.id)), err)]
    pub async fn update_cpc(&mut self, campaign: &Campaign) -> Result<Campaign> {
        let updated = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            UPDATE campaigns
            SET cpc = $2, average_cpc = $3, max_cpc = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(campaign.id)
        .bind(campaign.cpc)
        .bind(campaign.average_cpc)
        .bind(campaign.max_cpc)
        .fetch_optional(&mut *self.db)
        .await?;

        updated.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&id)), err)]
    pub async fn soft_delete(&mut self, id: CampaignId) -> Result<bool> {
        let result = sqlx::query("UPDATE campaigns SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
