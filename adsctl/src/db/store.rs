//! Storage traits implemented by every persistence backend.
//!
//! Services depend on these traits rather than on a concrete database so that the same
//! request handling runs against PostgreSQL in production and the in-memory backend in tests.
//! Both backends must agree on the semantics documented here.

use crate::db::errors::Result;
use crate::db::models::{
    cpc::CpcEntity,
    demographics::{DemographicsPerformance, DemographicsSummary, DemographicsUpsert, UpsertOutcome, UserDemographics},
};
use crate::types::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Single-row persistence for one CPC-carrying entity type.
///
/// Soft-deleted rows are invisible to every read and write.
#[async_trait]
pub trait EntityStore<E: CpcEntity>: Send + Sync {
    /// Insert a new entity under `parent_id`.
    ///
    /// # Errors
    /// - `ForeignKeyViolation` if the parent does not exist
    async fn create(&self, parent_id: Uuid, draft: &E::Draft) -> Result<E>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<E>>;

    /// Live children of `parent_id`, oldest first. Empty if there are none.
    async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<E>>;

    /// Persist the platform-sourced fields (the CPC triple, plus keyword metrics) of `entity`
    /// and bump `updated_at`. Everything else is left as stored.
    ///
    /// # Errors
    /// - `NotFound` if the entity no longer exists
    async fn save(&self, entity: &E) -> Result<E>;

    /// Soft delete. Returns false if there was no live row.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Persistence for per-user demographics records.
#[async_trait]
pub trait DemographicsStore: Send + Sync {
    async fn get_by_user(&self, user_id: UserId) -> Result<Option<UserDemographics>>;

    /// Insert the user's record, or overwrite its mutable fields keeping `id` and `created_at`
    async fn upsert(&self, record: &DemographicsUpsert) -> Result<UserDemographics>;

    /// Upsert every record in a single transaction. Either all records are written or none.
    async fn bulk_upsert(&self, records: &[DemographicsUpsert]) -> Result<UpsertOutcome>;

    /// Live records whose last platform refresh is strictly older than `cutoff`
    async fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserDemographics>>;

    /// The full user population, used by refresh-all
    async fn list_user_ids(&self) -> Result<Vec<UserId>>;

    async fn summary(&self) -> Result<DemographicsSummary>;

    /// Owners' campaign metrics averaged per (age range, gender) bucket, most users first.
    /// Ties are broken by age range then gender; metrics default to 0 where no campaign
    /// data exists.
    async fn performance(&self) -> Result<Vec<DemographicsPerformance>>;
}
