//! Database layer for data persistence and access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  (services::CpcService, services::DemographicsService)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Stores    │  (db::store traits - PostgresStore or InMemoryStore)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - per-table queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: The storage traits services depend on
//! - [`postgres`]: PostgreSQL implementation, delegating to [`handlers`]
//! - [`memory`]: In-memory implementation for tests and single-process deployments
//! - [`handlers`]: Per-table repositories over a SQLx connection
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! adsctl::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

#[cfg(test)]
mod tests;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{DemographicsStore, EntityStore};
