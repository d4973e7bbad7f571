//! Read, overwrite and refresh the CPC fields of campaigns, ad groups and keywords.
//!
//! One [`CpcService`] is instantiated per entity type; the [`CpcEntity`] capability supplies
//! everything that differs between them.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    ads_platform::{AdsPlatform, AdsPlatformError},
    db::{
        EntityStore,
        errors::DbError,
        models::cpc::{CpcEntity, CpcFields},
    },
    errors::{Error, Result},
    types::abbrev_uuid,
};

pub struct CpcService<E: CpcEntity> {
    store: Arc<dyn EntityStore<E>>,
    platform: Arc<dyn AdsPlatform>,
    request_timeout: Duration,
}

impl<E: CpcEntity> Clone for CpcService<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            platform: self.platform.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<E: CpcEntity> CpcService<E> {
    pub fn new(store: Arc<dyn EntityStore<E>>, platform: Arc<dyn AdsPlatform>, request_timeout: Duration) -> Self {
        Self {
            store,
            platform,
            request_timeout,
        }
    }

    #[instrument(skip(self), fields(kind = %E::KIND, id = %abbrev_uuid(&id)), err)]
    pub async fn get(&self, id: Uuid) -> Result<E> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(E::KIND, id))
    }

    /// Live children of `parent_id`; empty when there are none
    #[instrument(skip(self), fields(kind = %E::KIND, parent_id = %abbrev_uuid(&parent_id)), err)]
    pub async fn list(&self, parent_id: Uuid) -> Result<Vec<E>> {
        Ok(self.store.list_by_parent(parent_id).await?)
    }

    #[instrument(skip(self, draft), fields(kind = %E::KIND, parent_id = %abbrev_uuid(&parent_id)), err)]
    pub async fn create(&self, parent_id: Uuid, draft: &E::Draft) -> Result<E> {
        let entity = match self.store.create(parent_id, draft).await {
            Ok(entity) => entity,
            Err(DbError::ForeignKeyViolation { .. }) => {
                return Err(Error::NotFound {
                    resource: E::KIND.parent_resource_name().to_string(),
                    id: parent_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        info!(id = %entity.id(), "Created {}", E::KIND);
        Ok(entity)
    }

    /// Overwrite all three CPC fields. `None` clears a field. No ordering between the fields is
    /// enforced, and repeating the call with the same values leaves the same state.
    #[instrument(skip(self), fields(kind = %E::KIND, id = %abbrev_uuid(&id)), err)]
    pub async fn update_cpc(&self, id: Uuid, cpc: CpcFields) -> Result<E> {
        let mut entity = self.get(id).await?;
        entity.set_cpc(cpc);
        self.persist(entity).await
    }

    /// Pull current metrics from the ads platform and overwrite the stored ones wholesale.
    ///
    /// # Errors
    /// - `NotLinked` if the entity has no external ID; nothing is written
    /// - `Upstream` if the platform fails or does not answer within the request timeout
    #[instrument(skip(self), fields(kind = %E::KIND, id = %abbrev_uuid(&id)), err)]
    pub async fn refresh_from_external(&self, id: Uuid) -> Result<E> {
        let mut entity = self.get(id).await?;

        let external_id = match entity.external_id() {
            Some(external_id) if !external_id.trim().is_empty() => external_id.to_string(),
            _ => {
                return Err(Error::NotLinked {
                    kind: E::KIND,
                    id: id.to_string(),
                });
            }
        };

        let fetched = tokio::time::timeout(self.request_timeout, self.platform.fetch_metrics(E::KIND, &external_id))
            .await
            .unwrap_or(Err(AdsPlatformError::Timeout(self.request_timeout)));

        let snapshot = match fetched {
            Ok(snapshot) => {
                counter!("adsctl_cpc_refresh_total", "kind" => E::KIND.as_str(), "outcome" => "success").increment(1);
                snapshot
            }
            Err(e) => {
                counter!("adsctl_cpc_refresh_total", "kind" => E::KIND.as_str(), "outcome" => "failure").increment(1);
                warn!(%external_id, error = %e, "Failed to refresh {} from the ads platform", E::KIND);
                return Err(e.into());
            }
        };

        entity.apply_snapshot(&snapshot);
        self.persist(entity).await
    }

    /// Soft delete
    #[instrument(skip(self), fields(kind = %E::KIND, id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(Error::not_found(E::KIND, id))
        }
    }

    async fn persist(&self, entity: E) -> Result<E> {
        let id = entity.id();
        match self.store.save(&entity).await {
            Ok(saved) => Ok(saved),
            // Deleted between the read and the write
            Err(DbError::NotFound) => Err(Error::not_found(E::KIND, id)),
            Err(e) => Err(e.into()),
        }
    }
}
