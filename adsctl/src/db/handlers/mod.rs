//! Repository implementations for PostgreSQL access.
//!
//! This module provides repository structs for each table. Repositories follow a consistent
//! pattern:
//! - Wrap a SQLx connection or transaction
//! - Provide strongly-typed operations
//! - Handle query construction and parameter binding
//! - Return models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: The audience population
//! - [`Campaigns`], [`AdGroups`], [`Keywords`]: The CPC-carrying ad hierarchy
//! - [`Demographics`]: Per-user demographics records, distributions and performance
//!
//! # Common Pattern
//!
//! ```ignore
//! use adsctl::db::handlers::Demographics;
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Demographics::new(&mut tx);
//!     let summary = repo.summary().await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod ad_groups;
pub mod campaigns;
pub mod demographics;
pub mod keywords;
pub mod users;

pub use ad_groups::AdGroups;
pub use campaigns::Campaigns;
pub use demographics::Demographics;
pub use keywords::Keywords;
pub use users::Users;
