//! Database models for ad groups.

use super::cpc::{CpcEntity, CpcFields};
use crate::types::{AdGroupId, CampaignId, EntityKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database representation of an ad group
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdGroup {
    pub id: AdGroupId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub status: String,
    /// Free-form targeting criteria, stored as JSONB
    pub targeting: Option<serde_json::Value>,
    pub google_ads_ad_group_id: Option<String>,
    pub cpc: Option<Decimal>,
    pub average_cpc: Option<Decimal>,
    pub max_cpc: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Database request for creating a new ad group
#[derive(Debug, Clone)]
pub struct AdGroupCreateDBRequest {
    pub name: String,
    pub status: String,
    pub targeting: Option<serde_json::Value>,
    pub google_ads_ad_group_id: Option<String>,
    pub cpc: CpcFields,
}

impl CpcEntity for AdGroup {
    type Draft = AdGroupCreateDBRequest;

    const KIND: EntityKind = EntityKind::AdGroup;

    fn id(&self) -> AdGroupId {
        self.id
    }

    fn parent_id(&self) -> CampaignId {
        self.campaign_id
    }

    fn external_id(&self) -> Option<&str> {
        self.google_ads_ad_group_id.as_deref()
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

    fn from_draft(id: AdGroupId, campaign_id: CampaignId, draft: AdGroupCreateDBRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            campaign_id,
            name: draft.name,
            status: draft.status,
            targeting: draft.targeting,
            google_ads_ad_group_id: draft.google_ads_ad_group_id,
            cpc: draft.cpc.cpc,
            average_cpc: draft.cpc.average_cpc,
            max_cpc: draft.cpc.max_cpc,
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
