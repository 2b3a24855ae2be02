use axum::{Json, extract::State};

use crate::incoming::http_axum::{
    core::extractors::Caller, dto::responses::CreditsResponse, error_mapper::HttpError,
};
use crate::shared::app_state::AppState;
use stylist_application::ports::incoming::credits::CreditQueryUseCase;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::InternalServerErrorResponse;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/api/credits",
    params(
        ("user-id" = Option<String>, Header, description = "Caller identifier, defaults to \"default\"")
    ),
    responses(
        (status = 200, body = CreditsResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "credits",
    summary = "Read credit balance",
    description = "Returns the caller's remaining generation credits. Unknown callers have 0 credits; reading never creates a ledger entry.",
    operation_id = "get_credits"
))]
pub async fn get_credits(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<CreditsResponse>, HttpError> {
    let credits_uc: &dyn CreditQueryUseCase = &*state.credit_query_service;
    let balance = credits_uc
        .credits_of(&user_id)
        .await
        .map_err(HttpError)?;

    Ok(Json(CreditsResponse {
        credits: balance.available,
    }))
}
