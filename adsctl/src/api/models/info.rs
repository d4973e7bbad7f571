//! Service banner.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Static information about the running service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    #[schema(example = "Ads control layer API v1")]
    pub message: String,
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            message: "Ads control layer API v1".to_string(),
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
