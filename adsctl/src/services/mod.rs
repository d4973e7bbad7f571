//! Business logic between the HTTP handlers and the stores.
//!
//! - [`cpc`]: generic CPC service shared by campaigns, ad groups and keywords
//! - [`demographics`]: demographics lookups, aggregates and batch refreshes
//! - [`scheduler`]: optional background refresh of stale demographics

pub mod cpc;
pub mod demographics;
pub mod scheduler;

pub use cpc::CpcService;
pub use demographics::{DemographicsService, RefreshReport};
pub use scheduler::StaleRefreshDaemon;
