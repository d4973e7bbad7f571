//! Per-user demographics: lookups, aggregates and refreshes from the ads platform.
//!
//! Batch refreshes fetch users concurrently (bounded by `demographics.refresh_concurrency`),
//! drop the users whose fetch failed, and write the successes with one bulk upsert.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::{StreamExt, stream};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    ads_platform::{AdsPlatform, AdsPlatformError, DemographicsSnapshot},
    db::{
        DemographicsStore,
        errors::DbError,
        models::demographics::{DemographicsPerformance, DemographicsSummary, DemographicsUpsert, UserDemographics},
    },
    errors::{Error, Result},
    types::{UserId, abbrev_uuid},
};

/// Counts reported by a batch refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RefreshReport {
    /// Users considered for refresh
    pub attempted: usize,
    /// Users whose platform fetch succeeded and were written
    pub refreshed: usize,
    /// Users whose platform fetch failed and were skipped
    pub failed: usize,
    /// Records created by the write
    pub inserted: usize,
    /// Existing records overwritten by the write
    pub updated: usize,
}

#[derive(Clone)]
pub struct DemographicsService {
    store: Arc<dyn DemographicsStore>,
    platform: Arc<dyn AdsPlatform>,
    request_timeout: Duration,
    refresh_concurrency: usize,
}

impl DemographicsService {
    pub fn new(
        store: Arc<dyn DemographicsStore>,
        platform: Arc<dyn AdsPlatform>,
        request_timeout: Duration,
        refresh_concurrency: usize,
    ) -> Self {
        Self {
            store,
            platform,
            request_timeout,
            refresh_concurrency: refresh_concurrency.max(1),
        }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get(&self, user_id: UserId) -> Result<UserDemographics> {
        self.store.get_by_user(user_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Demographics for user".to_string(),
            id: user_id.to_string(),
        })
    }

    /// Fetch the user's demographics from the platform and store them, creating the record if
    /// needed. An existing record keeps its `id` and `created_at`.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn update(&self, user_id: UserId) -> Result<UserDemographics> {
        let snapshot = self.fetch(user_id).await?;
        let record = to_upsert(user_id, snapshot);

        match self.store.upsert(&record).await {
            Ok(stored) => Ok(stored),
            Err(DbError::ForeignKeyViolation { .. }) => Err(Error::NotFound {
                resource: "User".to_string(),
                id: user_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn summary(&self) -> Result<DemographicsSummary> {
        Ok(self.store.summary().await?)
    }

    #[instrument(skip(self), err)]
    pub async fn performance_by_demographics(&self) -> Result<Vec<DemographicsPerformance>> {
        Ok(self.store.performance().await?)
    }

    /// Refresh every user in the population
    #[instrument(skip(self), err)]
    pub async fn refresh_all(&self) -> Result<RefreshReport> {
        let user_ids = self.store.list_user_ids().await?;
        info!(users = user_ids.len(), "Refreshing demographics for all users");
        self.refresh_users(user_ids).await
    }

    /// Refresh records whose last platform update is older than `older_than`
    #[instrument(skip(self), err)]
    pub async fn refresh_stale(&self, older_than: Duration) -> Result<RefreshReport> {
        let window = chrono::Duration::from_std(older_than).map_err(|_| Error::BadRequest {
            message: format!("Staleness window {older_than:?} is out of range"),
        })?;
        let cutoff = Utc::now() - window;

        let stale = self.store.list_stale(cutoff).await?;
        info!(stale = stale.len(), %cutoff, "Refreshing stale demographics");
        self.refresh_users(stale.into_iter().map(|record| record.user_id).collect())
            .await
    }

    async fn refresh_users(&self, user_ids: Vec<UserId>) -> Result<RefreshReport> {
        let attempted = user_ids.len();

        let results: Vec<_> = stream::iter(user_ids)
            .map(|user_id| async move { (user_id, self.fetch(user_id).await) })
            .buffer_unordered(self.refresh_concurrency)
            .collect()
            .await;

        let mut records = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (user_id, result) in results {
            match result {
                Ok(snapshot) => records.push(to_upsert(user_id, snapshot)),
                Err(e) => {
                    warn!(user_id = %abbrev_uuid(&user_id), error = %e, "Failed to fetch demographics, skipping user");
                    failed += 1;
                }
            }
        }
        // Stable write order regardless of fetch completion order
        records.sort_by_key(|record| record.user_id);

        counter!("adsctl_demographics_refresh_total", "outcome" => "success").increment(records.len() as u64);
        counter!("adsctl_demographics_refresh_total", "outcome" => "failure").increment(failed as u64);

        let outcome = if records.is_empty() {
            Default::default()
        } else {
            self.store.bulk_upsert(&records).await?
        };

        let report = RefreshReport {
            attempted,
            refreshed: records.len(),
            failed,
            inserted: outcome.inserted,
            updated: outcome.updated,
        };
        info!(
            attempted = report.attempted,
            refreshed = report.refreshed,
            failed = report.failed,
            inserted = report.inserted,
            updated = report.updated,
            "Demographics refresh complete"
        );
        Ok(report)
    }

    async fn fetch(&self, user_id: UserId) -> std::result::Result<DemographicsSnapshot, AdsPlatformError> {
        tokio::time::timeout(self.request_timeout, self.platform.fetch_demographics(user_id))
            .await
            .unwrap_or(Err(AdsPlatformError::Timeout(self.request_timeout)))
    }
}

fn to_upsert(user_id: UserId, snapshot: DemographicsSnapshot) -> DemographicsUpsert {
    DemographicsUpsert {
        user_id,
        age_range: snapshot.age_range,
        gender: snapshot.gender,
        confidence: snapshot.confidence,
        data_source: snapshot.data_source,
        privacy_compliant: snapshot.privacy_compliant,
        last_updated_from_api: Utc::now(),
    }
}
