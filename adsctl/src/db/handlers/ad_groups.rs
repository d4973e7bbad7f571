//! Database repository for ad groups.

use crate::{
    db::{
        errors::{DbError, Result},
        models::ad_groups::{AdGroup, AdGroupCreateDBRequest},
    },
    types::{AdGroupId, CampaignId, abbrev_uuid},
};
use sqlx::PgConnection;
use tracing::instrument;

const AD_GROUP_COLUMNS: &str = "id, campaign_id, name, status, targeting, google_ads_ad_group_id, cpc, average_cpc, max_cpc, \
     created_at, updated_at, deleted_at";

pub struct AdGroups<'c> {
    db: &'c mut PgConnection,
}

impl<'c> AdGroups<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(campaign_id = %abbrev_uuid(&campaign_id), name = %request.name), err)]
    pub async fn create(&mut self, campaign_id: CampaignId, request: &AdGroupCreateDBRequest) -> Result<AdGroup> {
        let ad_group = sqlx::query_as::<_, AdGroup>(&format!(
            r#"
            INSERT INTO ad_groups (campaign_id, name, status, targeting, google_ads_ad_group_id, cpc, average_cpc, max_cpc)
            SELECT id, $2, $3, $4, $5, $6, $7, $8
            FROM campaigns
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {AD_GROUP_COLUMNS}
            "#
        ))
        .bind(campaign_id)
        .bind(&request.name)
        .bind(&request.status)
        .bind(&request.targeting)
        .bind(&request.google_ads_ad_group_id)
        .bind(request.cpc.cpc)
        .bind(request.cpc.average_cpc)
        .bind(request.cpc.max_cpc)
        .fetch_optional(&mut *self.db)
        .await?;

        // No row means the campaign is missing or soft-deleted
        ad_group.ok_or_else(|| DbError::ForeignKeyViolation {
            constraint: Some("ad_groups_campaign_id_fkey".to_string()),
            table: Some("ad_groups".to_string()),
            message: "campaign does not exist or has been deleted".to_string(),
        })
    }

    #[instrument(skip(self), fields(ad_group_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: AdGroupId) -> Result<Option<AdGroup>> {
        let ad_group = sqlx::query_as::<_, AdGroup>(&format!(
            "SELECT {AD_GROUP_COLUMNS} FROM ad_groups WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(ad_group)
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&campaign_id)), err)]
    pub async fn list_by_campaign(&mut self, campaign_id: CampaignId) -> Result<Vec<AdGroup>> {
        let ad_groups = sqlx::query_as::<_, AdGroup>(&format!(
            r#"
            SELECT {AD_GROUP_COLUMNS}
            FROM ad_groups
            WHERE campaign_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(campaign_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(ad_groups)
    }

    /// Overwrite the CPC triple of a live ad group
    #[instrument(skip(self, ad_group), fields(ad_group_id = %abbrev_uuid(&ad_group.id)), err)]
    pub async fn update_cpc(&mut self, ad_group: &AdGroup) -> Result<AdGroup> {
        let updated = sqlx::query_as::<_, AdGroup>(&format!(
            r#"
            UPDATE ad_groups
            SET cpc = $2, average_cpc = $3, max_cpc = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {AD_GROUP_COLUMNS}
            "#
        ))
        .bind(ad_group.id)
        .bind(ad_group.cpc)
        .bind(ad_group.average_cpc)
        .bind(ad_group.max_cpc)
        .fetch_optional(&mut *self.db)
        .await?;

        updated.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(ad_group_id = %abbrev_uuid(&id)), err)]
    pub async fn soft_delete(&mut self, id: AdGroupId) -> Result<bool> {
        let result = sqlx::query("UPDATE ad_groups SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
