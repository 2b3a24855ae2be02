use axum::Json;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::responses::ApiResponseValue;
use crate::incoming::http_axum::dto::responses::ApiResponse;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = ApiResponseValue,
         example = json!({ "ok": true })
        )
    ),
    tag = "system",
    summary = "Liveness check",
    operation_id = "health_check"
))]
pub async fn health_check() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success())
}
