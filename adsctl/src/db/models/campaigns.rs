//! Database models for campaigns.

use super::cpc::{CpcEntity, CpcFields};
use crate::types::{CampaignId, EntityKind, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database representation of a campaign
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Campaign {
    pub id: CampaignId,
    pub user_id: UserId,
    pub name: String,
    pub status: String,
    pub google_ads_campaign_id: Option<String>,
    pub cpc: Option<Decimal>,
    pub average_cpc: Option<Decimal>,
    pub max_cpc: Option<Decimal>,
    pub click_through_rate: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub roas: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Database request for creating a new campaign
#[derive(Debug, Clone)]
pub struct CampaignCreateDBRequest {
    pub name: String,
    pub status: String,
    pub google_ads_campaign_id: Option<String>,
    pub cpc: CpcFields,
    pub click_through_rate: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub roas: Option<f64>,
}

impl CpcEntity for Campaign {
    type Draft = CampaignCreateDBRequest;

    const KIND: EntityKind = EntityKind::Campaign;

    fn id(&self) -> CampaignId {
        self.id
    }

    fn parent_id(&self) -> UserId {
        self.user_id
    }

    fn external_id(&self) -> Option<&str> {
        self.google_ads_campaign_id.as_deref()
    }

    fn cpc(&self) -> CpcFields {
        CpcFields {
            cpc: self.cpc,
            average_cpc: self.average_cpc,
            max_cpc: self.max_cpc,
        }
    }

    fn set_cpc(&mut self, cpc: CpcFields) {
        self.cpc = cpc.cpc;
        self.average_cpc = cpc.average_cpc;
        self.max_cpc = cpc.max_cpc;
    }

    fn from_draft(id: CampaignId, user_id: UserId, draft: CampaignCreateDBRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            name: draft.name,
            status: draft.status,
            google_ads_campaign_id: draft.google_ads_campaign_id,
            cpc: draft.cpc.cpc,
            average_cpc: draft.cpc.average_cpc,
            max_cpc: draft.cpc.max_cpc,
            click_through_rate: draft.click_through_rate,
            conversion_rate: draft.conversion_rate,
            roas: draft.roas,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
