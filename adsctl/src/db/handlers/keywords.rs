//! Database repository for keywords.

use crate::{
    db::{
        errors::{DbError, Result},
        models::keywords::{Keyword, KeywordCreateDBRequest},
    },
    types::{AdGroupId, KeywordId, abbrev_uuid},
};
use sqlx::PgConnection;
use tracing::instrument;

const KEYWORD_COLUMNS: &str = "id, ad_group_id, text, match_type, status, google_ads_keyword_id, cpc, average_cpc, max_cpc, \
     quality_score, impressions, clicks, cost, created_at, updated_at, deleted_at";

pub struct Keywords<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Keywords<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(ad_group_id = %abbrev_uuid(&ad_group_id), text = %request.text), err)]
    pub async fn create(&mut self, ad_group_id: AdGroupId, request: &KeywordCreateDBRequest) -> Result<Keyword> {
        let keyword = sqlx::query_as::<_, Keyword>(&format!(
            r#"
            INSERT INTO keywords (ad_group_id, text, match_type, status, google_ads_keyword_id, cpc, average_cpc, max_cpc)
            SELECT id, $2, $3, $4, $5, $6, $7, $8
            FROM ad_groups
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {KEYWORD_COLUMNS}
            "#
        ))
        .bind(ad_group_id)
        .bind(&request.text)
        .bind(request.match_type)
        .bind(&request.status)
        .bind(&request.google_ads_keyword_id)
        .bind(request.cpc.cpc)
        .bind(request.cpc.average_cpc)
        .bind(request.cpc.max_cpc)
        .fetch_optional(&mut *self.db)
        .await?;

        // No row means the ad group is missing or soft-deleted
        keyword.ok_or_else(|| DbError::ForeignKeyViolation {
            constraint: Some("keywords_ad_group_id_fkey".to_string()),
            table: Some("keywords".to_string()),
            message: "ad group does not exist or has been deleted".to_string(),
        })
    }

    #[instrument(skip(self), fields(keyword_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: KeywordId) -> Result<Option<Keyword>> {
        let keyword = sqlx::query_as::<_, Keyword>(&format!(
            "SELECT {KEYWORD_COLUMNS} FROM keywords WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(keyword)
    }

    #[instrument(skip(self), fields(ad_group_id = %abbrev_uuid(&ad_group_id)), err)]
    pub async fn list_by_ad_group(&mut self, ad_group_id: AdGroupId) -> Result<Vec<Keyword>> {
        let keywords = sqlx::query_as::<_, Keyword>(&format!(
            r#"
            SELECT {KEYWORD_COLUMNS}
            FROM keywords
            WHERE ad_group_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(ad_group_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(keywords)
    }

    /// Overwrite the CPC triple and performance counters of a live keyword
    #[instrument(skip(self, keyword), fields(keyword_id = %abbrev_uuid(&keyword.id)), err)]
    pub async fn update_metrics(&mut self, keyword: &Keyword) -> Result<Keyword> {
        let updated = sqlx::query_as::<_, Keyword>(&format!(
            r#"
            UPDATE keywords
            SET cpc = $2, average_cpc = $3, max_cpc = $4,
                quality_score = $5, impressions = $6, clicks = $7, cost = $8,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {KEYWORD_COLUMNS}
            "#
        ))
        .bind(keyword.id)
        .bind(keyword.cpc)
        .bind(keyword.average_cpc)
        .bind(keyword.max_cpc)
        .bind(keyword.quality_score)
        .bind(keyword.impressions)
        .bind(keyword.clicks)
        .bind(keyword.cost)
        .fetch_optional(&mut *self.db)
        .await?;

        updated.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(keyword_id = %abbrev_uuid(&id)), err)]
    pub async fn soft_delete(&mut self, id: KeywordId) -> Result<bool> {
        let result = sqlx::query("UPDATE keywords SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
