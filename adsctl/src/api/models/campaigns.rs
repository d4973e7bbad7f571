//! API request/response models for campaigns.

use super::common::{CpcUpdate, default_status, require_non_empty};
use crate::db::models::campaigns::{Campaign, CampaignCreateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{CampaignId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a campaign owned by the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignCreate {
    #[schema(example = "Spring Shoes")]
    pub name: String,
    /// Defaults to `active`
    #[schema(example = "active")]
    pub status: Option<String>,
    /// Campaign ID on the ads platform; required for CPC refreshes
    #[schema(example = "1234567890")]
    pub google_ads_campaign_id: Option<String>,
    #[serde(flatten)]
    pub cpc: CpcUpdate,
    /// Fraction of impressions that were clicked, in [0, 1]
    pub click_through_rate: Option<f64>,
    /// Fraction of clicks that converted, in [0, 1]
    pub conversion_rate: Option<f64>,
    /// Return on ad spend
    pub roas: Option<f64>,
}

impl CampaignCreate {
    pub fn into_db_request(self) -> Result<CampaignCreateDBRequest> {
        for (field, value) in [("click_through_rate", self.click_through_rate), ("conversion_rate", self.conversion_rate)] {
            if let Some(rate) = value
                && !(0.0..=1.0).contains(&rate)
            {
                return Err(Error::BadRequest {
                    message: format!("{field} must be between 0 and 1"),
                });
            }
        }
        if let Some(roas) = self.roas
            && (!roas.is_finite() || roas < 0.0)
        {
            return Err(Error::BadRequest {
                message: "roas must be a non-negative number".to_string(),
            });
        }

        Ok(CampaignCreateDBRequest {
            name: require_non_empty("name", &self.name)?,
            status: default_status(self.status)?,
            google_ads_campaign_id: self.google_ads_campaign_id.filter(|id| !id.trim().is_empty()),
            cpc: self.cpc.into_fields()?,
            click_through_rate: self.click_through_rate,
            conversion_rate: self.conversion_rate,
            roas: self.roas,
        })
    }
}

/// Campaign details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CampaignId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub name: String,
    pub status: String,
    pub google_ads_campaign_id: Option<String>,
    #[schema(value_type = Option<String>, example = "1.50")]
    pub cpc: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "1.25")]
    pub average_cpc: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "2.00")]
    pub max_cpc: Option<Decimal>,
    pub click_through_rate: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub roas: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(db: Campaign) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            status: db.status,
            google_ads_campaign_id: db.google_ads_campaign_id,
            cpc: db.cpc,
            average_cpc: db.average_cpc,
            max_cpc: db.max_cpc,
            click_through_rate: db.click_through_rate,
            conversion_rate: db.conversion_rate,
            roas: db.roas,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
