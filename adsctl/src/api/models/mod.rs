//! API request and response data models.
//!
//! These structures define the public API contract and are kept separate from the database
//! records in [`crate::db::models`], so storage and wire formats can evolve independently.
//! Every model is annotated with `utoipa` for the generated OpenAPI document.
//!
//! - [`common`]: the `{message, data}` envelope, the `{error}` body and the CPC update payload
//! - [`campaigns`], [`ad_groups`], [`keywords`]: create payloads and responses for ad entities
//! - [`demographics`]: demographics records, aggregates and the stale-refresh query
//! - [`info`]: the service banner served at the API root
//!
//! Decimal amounts are serialized as strings (`"1.50"`) and accepted as strings or numbers.

pub mod ad_groups;
pub mod campaigns;
pub mod common;
pub mod demographics;
pub mod info;
pub mod keywords;
