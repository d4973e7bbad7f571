use axum::Json;

use crate::api::models::info::ServiceInfo;

#[utoipa::path(
    get,
    path = "/",
    tag = "info",
    summary = "Service information",
    responses(
        (status = 200, description = "Service name, status and version", body = ServiceInfo)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_info() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}
