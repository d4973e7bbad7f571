//! External ads platform abstraction layer
//!
//! This module defines the `AdsPlatform` trait which abstracts the third-party system that
//! supplies CPC metrics for campaigns, ad groups and keywords, and per-user demographics.
//! The service layer only ever talks to `Arc<dyn AdsPlatform>`, so the deterministic mock and
//! the HTTP client are interchangeable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    config::AdsPlatformConfig,
    db::models::{
        cpc::CpcFields,
        demographics::{AgeRange, Gender},
    },
    types::{EntityKind, UserId},
};

pub mod google_ads;
pub mod mock;

/// Create an ads platform client from configuration
///
/// This is the single point where we convert config into platform instances.
/// Adding a new platform requires adding a match arm here.
pub fn create_platform(config: &AdsPlatformConfig) -> Result<Arc<dyn AdsPlatform>> {
    match config {
        AdsPlatformConfig::Mock { .. } => Ok(Arc::new(mock::MockAdsPlatform::new())),
        AdsPlatformConfig::GoogleAds(google_ads_config) => {
            Ok(Arc::new(google_ads::GoogleAdsPlatform::new(google_ads_config.clone(), config.request_timeout())?))
        }
    }
}

/// Result type for ads platform operations
pub type Result<T> = std::result::Result<T, AdsPlatformError>;

/// Errors that can occur while talking to the ads platform
#[derive(Debug, thiserror::Error)]
pub enum AdsPlatformError {
    #[error("Ads platform request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Ads platform API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No {kind} with external ID {external_id} on the ads platform")]
    UnknownEntity { kind: EntityKind, external_id: String },

    #[error("Ads platform transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid ads platform response: {0}")]
    InvalidResponse(String),

    #[error("Invalid ads platform configuration: {0}")]
    Configuration(String),
}

/// Platform-sourced metrics for one entity.
///
/// The counters are only reported for keywords; they are `None` for campaigns and ad groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub cpc: CpcFields,
    pub quality_score: Option<i32>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub cost: Option<Decimal>,
}

/// Platform-sourced demographics for one user, already normalised to stored labels
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicsSnapshot {
    pub age_range: AgeRange,
    pub gender: Gender,
    /// Always within [0, 1] when present
    pub confidence: Option<f64>,
    pub data_source: String,
    pub privacy_compliant: bool,
}

impl DemographicsSnapshot {
    /// Build a snapshot from raw platform labels
    pub fn from_labels(age_range: &str, gender: &str, confidence: Option<f64>, data_source: impl Into<String>) -> Self {
        Self {
            age_range: AgeRange::from_platform(age_range),
            gender: Gender::from_platform(gender),
            confidence: confidence.filter(|c| c.is_finite()).map(|c| c.clamp(0.0, 1.0)),
            data_source: data_source.into(),
            privacy_compliant: true,
        }
    }
}

/// Abstract ads platform interface
#[async_trait]
pub trait AdsPlatform: Send + Sync {
    /// Fetch current metrics for the entity the platform knows as `external_id`
    async fn fetch_metrics(&self, kind: EntityKind, external_id: &str) -> Result<MetricsSnapshot>;

    /// Fetch demographics for one user
    async fn fetch_demographics(&self, user_id: UserId) -> Result<DemographicsSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_labels_are_normalised() {
        let snapshot = DemographicsSnapshot::from_labels("AGE_RANGE_45_54", "FEMALE", Some(1.7), "google_ads");
        assert_eq!(snapshot.age_range, AgeRange::From45To54);
        assert_eq!(snapshot.gender, Gender::Female);
        assert_eq!(snapshot.confidence, Some(1.0));

        let snapshot = DemographicsSnapshot::from_labels("???", "UNDETERMINED", Some(-0.2), "google_ads");
        assert_eq!(snapshot.age_range, AgeRange::Unknown);
        assert_eq!(snapshot.gender, Gender::Unknown);
        assert_eq!(snapshot.confidence, Some(0.0));
    }

    #[test]
    fn test_create_mock_platform() {
        let config = AdsPlatformConfig::Mock {
            request_timeout: Duration::from_secs(1),
        };
        assert!(create_platform(&config).is_ok());
    }
}
