//! Database models for keywords.

use super::cpc::{CpcEntity, CpcFields};
use crate::ads_platform::MetricsSnapshot;
use crate::types::{AdGroupId, EntityKind, KeywordId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Keyword match type stored as TEXT in database
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Phrase,
    #[default]
    Broad,
}

/// Database representation of a keyword
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Keyword {
    pub id: KeywordId,
    pub ad_group_id: AdGroupId,
    pub text: String,
    pub match_type: MatchType,
    pub status: String,
    pub google_ads_keyword_id: Option<String>,
    pub cpc: Option<Decimal>,
    pub average_cpc: Option<Decimal>,
    pub max_cpc: Option<Decimal>,
    pub quality_score: Option<i32>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Database request for creating a new keyword
#[derive(Debug, Clone)]
pub struct KeywordCreateDBRequest {
    pub text: String,
    pub match_type: MatchType,
    pub status: String,
    pub google_ads_keyword_id: Option<String>,
    pub cpc: CpcFields,
}

impl CpcEntity for Keyword {
    type Draft = KeywordCreateDBRequest;

    const KIND: EntityKind = EntityKind::Keyword;

    fn id(&self) -> KeywordId {
        self.id
    }

    fn parent_id(&self) -> AdGroupId {
        self.ad_group_id
    }

    fn external_id(&self) -> Option<&str> {
        self.google_ads_keyword_id.as_deref()
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

    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cpc: self.cpc(),
            quality_score: self.quality_score,
            impressions: self.impressions,
            clicks: self.clicks,
            cost: self.cost,
        }
    }

    /// Keywords also carry performance counters, which the platform reports alongside CPC
    fn apply_snapshot(&mut self, snapshot: &MetricsSnapshot) {
        self.set_cpc(snapshot.cpc.clone());
        self.quality_score = snapshot.quality_score;
        self.impressions = snapshot.impressions;
        self.clicks = snapshot.clicks;
        self.cost = snapshot.cost;
    }

    fn from_draft(id: KeywordId, ad_group_id: AdGroupId, draft: KeywordCreateDBRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            ad_group_id,
            text: draft.text,
            match_type: draft.match_type,
            status: draft.status,
            google_ads_keyword_id: draft.google_ads_keyword_id,
            cpc: draft.cpc.cpc,
            average_cpc: draft.cpc.average_cpc,
            max_cpc: draft.cpc.max_cpc,
            quality_score: None,
            impressions: None,
            clicks: None,
            cost: None,
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

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn keyword() -> Keyword {
        Keyword::from_draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            KeywordCreateDBRequest {
                text: "running shoes".to_string(),
                match_type: MatchType::Phrase,
                status: "active".to_string(),
                google_ads_keyword_id: Some("987654321".to_string()),
                cpc: CpcFields::default(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_apply_snapshot_overwrites_metrics_only() {
        let mut kw = keyword();
        let before = kw.clone();
        let snapshot = MetricsSnapshot {
            cpc: CpcFields::new(Decimal::new(135, 2), Decimal::new(110, 2), Decimal::new(175, 2)),
            quality_score: Some(8),
            impressions: Some(1000),
            clicks: Some(50),
            cost: Some(Decimal::new(6750, 2)),
        };

        kw.apply_snapshot(&snapshot);

        assert_eq!(kw.cpc(), snapshot.cpc);
        assert_eq!(kw.quality_score, Some(8));
        assert_eq!(kw.impressions, Some(1000));
        assert_eq!(kw.clicks, Some(50));
        assert_eq!(kw.cost, Some(Decimal::new(6750, 2)));
        assert_eq!(kw.id, before.id);
        assert_eq!(kw.text, before.text);
        assert_eq!(kw.status, before.status);
        assert_eq!(kw.match_type, before.match_type);
    }

    #[test]
    fn test_match_type_serialization() {
        assert_eq!(serde_json::to_string(&MatchType::Exact).unwrap(), "\"exact\"");
        assert_eq!(MatchType::default(), MatchType::Broad);
    }
}
