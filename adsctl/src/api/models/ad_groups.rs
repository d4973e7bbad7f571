//! API request/response models for ad groups.

use super::common::{CpcUpdate, default_status, require_non_empty};
use crate::db::models::ad_groups::{AdGroup, AdGroupCreateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{AdGroupId, CampaignId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating an ad group inside a campaign
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdGroupCreate {
    #[schema(example = "Running Shoes")]
    pub name: String,
    /// Defaults to `active`
    pub status: Option<String>,
    /// Free-form targeting rules; must be a JSON object when present
    #[schema(value_type = Option<Object>)]
    pub targeting: Option<serde_json::Value>,
    /// Ad group ID on the ads platform; required for CPC refreshes
    #[schema(example = "456")]
    pub google_ads_ad_group_id: Option<String>,
    #[serde(flatten)]
    pub cpc: CpcUpdate,
}

impl AdGroupCreate {
    pub fn into_db_request(self) -> Result<AdGroupCreateDBRequest> {
        if let Some(targeting) = &self.targeting
            && !targeting.is_object()
        {
            return Err(Error::BadRequest {
                message: "targeting must be a JSON object".to_string(),
            });
        }

        Ok(AdGroupCreateDBRequest {
            name: require_non_empty("name", &self.name)?,
            status: default_status(self.status)?,
            targeting: self.targeting,
            google_ads_ad_group_id: self.google_ads_ad_group_id.filter(|id| !id.trim().is_empty()),
            cpc: self.cpc.into_fields()?,
        })
    }
}

/// Ad group details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdGroupResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AdGroupId,
    #[schema(value_type = String, format = "uuid")]
    pub campaign_id: CampaignId,
    pub name: String,
    pub status: String,
    #[schema(value_type = Option<Object>)]
    pub targeting: Option<serde_json::Value>,
    pub google_ads_ad_group_id: Option<String>,
    #[schema(value_type = Option<String>, example = "1.40")]
    pub cpc: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "1.15")]
    pub average_cpc: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "1.80")]
    pub max_cpc: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdGroup> for AdGroupResponse {
    fn from(db: AdGroup) -> Self {
        Self {
            id: db.id,
            campaign_id: db.campaign_id,
            name: db.name,
            status: db.status,
            targeting: db.targeting,
            google_ads_ad_group_id: db.google_ads_ad_group_id,
            cpc: db.cpc,
            average_cpc: db.average_cpc,
            max_cpc: db.max_cpc,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
