use serde::{Deserialize, Serialize};
#[cfg(feature = "docs")]
use utoipa::ToSchema;
use validator::Validate;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Payment identifiers and signature returned by the checkout widget. userId is optional and falls back to the user-id header.",
    example = json!({
        "orderId": "order_IluGWxBm9U8zJ8",
        "paymentId": "pay_IluGWxBm9U8zJ9",
        "signature": "8b2798bfd2e5872065dd6fad1093d49bc25c2f20a72af1e260bd0ed6f9f3c5a3",
        "userId": "alice"
    })
))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, max = 128, message = "orderId is required"))]
    pub order_id: String,
    #[validate(length(min = 1, max = 128, message = "paymentId is required"))]
    pub payment_id: String,
    #[validate(length(min = 1, max = 256, message = "signature is required"))]
    pub signature: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub user_id: Option<String>,
}

/// Shape of the multipart form accepted by `/api/generate`. Only used to
/// document the endpoint; the handler reads the stream field by field.
#[cfg(feature = "docs")]
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct GenerateImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    #[schema(example = "ghibli")]
    pub style: Option<String>,
}
