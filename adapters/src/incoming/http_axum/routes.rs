use axum::{
    Router,
    routing::{get, post},
};
#[cfg(feature = "docs")]
use utoipa::OpenApi;
#[cfg(feature = "docs")]
use utoipa_swagger_ui::SwaggerUi;

use crate::incoming::http_axum::{
    handlers::{
        credits::get_credits,
        generation::generate_image,
        health::health_check,
        payments::{create_order, verify_payment},
    },
    router_ext::RouterExt,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::docs::ApiDoc;

pub fn build_application_router(state: &AppState) -> Router<AppState> {
    let api_routes = build_payment_routes()
        .merge(build_generation_routes(state))
        .route("/api/credits", get(get_credits))
        .with_request_id();

    build_core_routes().merge(api_routes)
}

fn build_core_routes() -> Router<AppState> {
    let router = Router::new().route("/health", get(health_check));

    #[cfg(feature = "docs")]
    {
        router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    #[cfg(not(feature = "docs"))]
    {
        router
    }
}

fn build_payment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pay", post(create_order))
        .route("/api/verify", post(verify_payment))
}

fn build_generation_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate_image))
        .with_upload_limit(state.config.uploads.max_upload_bytes)
}
