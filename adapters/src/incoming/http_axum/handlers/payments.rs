use axum::{Json, extract::State};
use axum_valid::Valid;
use tracing::info;

use domain::{auth::UserId, payment::PaymentVerification};
use stylist_application::{error::AppError, ports::incoming::payments::PaymentUseCase};

use crate::incoming::http_axum::{
    core::extractors::Caller,
    dto::{
        requests::VerifyPaymentRequest,
        responses::{PayOrderResponse, VerifyPaymentResponse},
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::{
    common_responses::{InternalServerErrorResponse, ValidationErrorResponse},
    responses::VerifyPaymentRejection,
};

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/api/pay",
    params(
        ("user-id" = Option<String>, Header, description = "Caller identifier, defaults to \"default\"")
    ),
    responses(
        (status = 200, body = PayOrderResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "payments",
    summary = "Create payment order",
    description = "Creates an order for the fixed credit pack with the payment provider. The caller id is attached to the order notes.",
    operation_id = "create_order"
))]
pub async fn create_order(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<PayOrderResponse>, HttpError> {
    let payments_uc: &dyn PaymentUseCase = &*state.payment_service;
    let order = payments_uc
        .create_order(user_id)
        .await
        .map_err(HttpError)?;

    Ok(Json(order.into()))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/api/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, body = VerifyPaymentResponse),
        (status = 400, description = "Signature does not match", body = VerifyPaymentRejection),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "payments",
    summary = "Verify payment and grant credits",
    description = "Checks the HMAC-SHA256 signature over orderId|paymentId and grants the credit pack once per order. Replays succeed without granting again.",
    operation_id = "verify_payment"
))]
pub async fn verify_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Valid(Json(request)): Valid<Json<VerifyPaymentRequest>>,
) -> Result<Json<VerifyPaymentResponse>, HttpError> {
    let user_id = match request.user_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => UserId::new(id),
        _ => caller,
    };

    let verification = PaymentVerification::new(
        &request.order_id,
        &request.payment_id,
        &request.signature,
        user_id,
    )
    .map_err(|e| HttpError(AppError::from(e)))?;

    let payments_uc: &dyn PaymentUseCase = &*state.payment_service;
    let verified = payments_uc
        .verify_payment(verification)
        .await
        .map_err(HttpError)?;

    if verified.newly_granted {
        info!(credits = verified.credits, "Verification granted a credit pack");
    } else {
        info!(credits = verified.credits, "Verification replayed, nothing granted");
    }

    Ok(Json(verified.into()))
}
