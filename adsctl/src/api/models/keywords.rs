//! API request/response models for keywords.

use super::common::{CpcUpdate, default_status, require_non_empty};
use crate::db::models::keywords::{Keyword, KeywordCreateDBRequest, MatchType};
use crate::errors::Result;
use crate::types::{AdGroupId, KeywordId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a keyword inside an ad group
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeywordCreate {
    #[schema(example = "running shoes")]
    pub text: String,
    /// Defaults to `broad`
    pub match_type: Option<MatchType>,
    /// Defaults to `active`
    pub status: Option<String>,
    /// Criterion ID on the ads platform; required for CPC refreshes
    #[schema(example = "987654321")]
    pub google_ads_keyword_id: Option<String>,
    #[serde(flatten)]
    pub cpc: CpcUpdate,
}

impl KeywordCreate {
    pub fn into_db_request(self) -> Result<KeywordCreateDBRequest> {
        Ok(KeywordCreateDBRequest {
            text: require_non_empty("text", &self.text)?,
            match_type: self.match_type.unwrap_or_default(),
            status: default_status(self.status)?,
            google_ads_keyword_id: self.google_ads_keyword_id.filter(|id| !id.trim().is_empty()),
            cpc: self.cpc.into_fields()?,
        })
    }
}

/// Keyword details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeywordResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: KeywordId,
    #[schema(value_type = String, format = "uuid")]
    pub ad_group_id: AdGroupId,
    pub text: String,
    pub match_type: MatchType,
    pub status: String,
    pub google_ads_keyword_id: Option<String>,
    #[schema(value_type = Option<String>, example = "1.35")]
    pub cpc: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "1.10")]
    pub average_cpc: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "1.75")]
    pub max_cpc: Option<Decimal>,
    /// Platform quality score, 1 to 10
    pub quality_score: Option<i32>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    /// Total spend
    #[schema(value_type = Option<String>, example = "67.50")]
    pub cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Keyword> for KeywordResponse {
    fn from(db: Keyword) -> Self {
        Self {
            id: db.id,
            ad_group_id: db.ad_group_id,
            text: db.text,
            match_type: db.match_type,
            status: db.status,
            google_ads_keyword_id: db.google_ads_keyword_id,
            cpc: db.cpc,
            average_cpc: db.average_cpc,
            max_cpc: db.max_cpc,
            quality_score: db.quality_score,
            impressions: db.impressions,
            clicks: db.clicks,
            cost: db.cost,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
