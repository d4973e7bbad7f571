//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by the storage backends to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **SQLx Integration**: Models derive `sqlx::FromRow` for query results
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//!
//! # Model Categories
//!
//! ## Ad entities
//!
//! - [`campaigns`], [`ad_groups`], [`keywords`]: the CPC-carrying hierarchy, all
//!   implementing [`cpc::CpcEntity`]
//!
//! ## Audience
//!
//! - [`users`]: the user population, provisioned upstream
//! - [`demographics`]: per-user demographics records and aggregate views
//!
//! # Conversion to API Models
//!
//! Database models implement `From` conversions to API models:
//!
//! ```ignore
//! use adsctl::db::models::campaigns::Campaign;
//! use adsctl::api::models::campaigns::CampaignResponse;
//!
//! let campaign: Campaign = /* ... */;
//! let api_response: CampaignResponse = campaign.into();
//! ```

pub mod ad_groups;
pub mod campaigns;
pub mod cpc;
pub mod demographics;
pub mod keywords;
pub mod users;
