//! Deterministic ads platform for development and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::{AdsPlatform, DemographicsSnapshot, MetricsSnapshot, Result};
use crate::{
    db::models::{
        cpc::CpcFields,
        demographics::{AgeRange, Gender},
    },
    types::{EntityKind, UserId},
};

/// Returns fixed metrics per entity kind, whatever the external ID.
#[derive(Debug, Clone, Default)]
pub struct MockAdsPlatform;

impl MockAdsPlatform {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AdsPlatform for MockAdsPlatform {
    async fn fetch_metrics(&self, kind: EntityKind, external_id: &str) -> Result<MetricsSnapshot> {
        debug!(%kind, external_id, "Serving mock metrics");

        let snapshot = match kind {
            EntityKind::Campaign => MetricsSnapshot {
                cpc: CpcFields::new(Decimal::new(150, 2), Decimal::new(125, 2), Decimal::new(200, 2)),
                ..Default::default()
            },
            EntityKind::AdGroup => MetricsSnapshot {
                cpc: CpcFields::new(Decimal::new(140, 2), Decimal::new(115, 2), Decimal::new(180, 2)),
                ..Default::default()
            },
            EntityKind::Keyword => MetricsSnapshot {
                cpc: CpcFields::new(Decimal::new(135, 2), Decimal::new(110, 2), Decimal::new(175, 2)),
                quality_score: Some(8),
                impressions: Some(1000),
                clicks: Some(50),
                cost: Some(Decimal::new(6750, 2)),
            },
        };
        Ok(snapshot)
    }

    async fn fetch_demographics(&self, user_id: UserId) -> Result<DemographicsSnapshot> {
        debug!(%user_id, "Serving mock demographics");

        Ok(DemographicsSnapshot {
            age_range: AgeRange::Unknown,
            gender: Gender::Unknown,
            confidence: Some(0.5),
            data_source: "google_ads".to_string(),
            privacy_compliant: true,
        })
    }
}
