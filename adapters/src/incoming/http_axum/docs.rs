use crate::incoming::http_axum::{dto, handlers};
use dto::common_responses::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, PayloadTooLargeResponse,
    ValidationErrorResponse,
};
use dto::requests::{GenerateImageForm, VerifyPaymentRequest};
use dto::responses::{
    ApiResponseValue, CreditsResponse, GenerateImageResponse, PayOrderResponse,
    VerifyPaymentRejection, VerifyPaymentResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::payments::create_order,
        handlers::payments::verify_payment,
        handlers::generation::generate_image,
        handlers::credits::get_credits,
        handlers::health::health_check,
    ),
    components(
        schemas(
            VerifyPaymentRequest,
            GenerateImageForm,
            PayOrderResponse,
            VerifyPaymentResponse,
            VerifyPaymentRejection,
            GenerateImageResponse,
            CreditsResponse,
            ApiResponseValue
        ),
        responses(
            BadRequestResponse,
            ForbiddenResponse,
            PayloadTooLargeResponse,
            ValidationErrorResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "payments", description = "Credit pack purchase - create a provider order, then verify the checkout signature to receive credits"),
        (name = "generation", description = "Image restyling - spend one credit to run the uploaded image through the inference provider"),
        (name = "credits", description = "Credit balance lookup"),
        (name = "system", description = "Service liveness")
    ),
    info(
        title = "Stylist Backend API",
        description = "Pay-per-use image restyling. Callers buy credit packs through the payment provider and spend one credit per generated image. Callers are identified by the user-id header.",
    ),
    servers(
        (url = "http://localhost:5000", description = "Development server"),
    )
)]
pub struct ApiDoc;
