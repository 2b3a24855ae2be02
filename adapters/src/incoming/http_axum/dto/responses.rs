use serde::Serialize;
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use domain::generation::GeneratedImage;
use domain::payment::{PaymentOrder, VerifiedPayment};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            data: None,
        }
    }
}

#[cfg(feature = "docs")]
#[derive(Serialize, ToSchema)]
#[schema(title = "ApiResponseValue")]
pub struct ApiResponseValue {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Order created with the payment provider, to be handed to the checkout widget",
    example = json!({
        "orderId": "order_IluGWxBm9U8zJ8",
        "amount": 100,
        "currency": "INR"
    })
))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOrderResponse {
    pub order_id: String,
    /// Minor currency units.
    pub amount: u64,
    pub currency: String,
}

impl From<PaymentOrder> for PayOrderResponse {
    fn from(order: PaymentOrder) -> Self {
        Self {
            order_id: order.id.as_str().to_string(),
            amount: order.amount_minor,
            currency: order.currency,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({ "success": true, "credits": 7 })))]
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub credits: u64,
}

impl From<VerifiedPayment> for VerifyPaymentResponse {
    fn from(verified: VerifiedPayment) -> Self {
        Self {
            success: true,
            credits: verified.credits,
        }
    }
}

#[cfg(feature = "docs")]
#[derive(Serialize, ToSchema)]
#[schema(example = json!({ "success": false, "message": "Invalid payment signature" }))]
pub struct VerifyPaymentRejection {
    pub success: bool,
    pub message: String,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({
    "url": "https://replicate.delivery/pbxt/out-0.png",
    "creditsLeft": 6
})))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub url: String,
    pub credits_left: u64,
}

impl From<GeneratedImage> for GenerateImageResponse {
    fn from(image: GeneratedImage) -> Self {
        Self {
            url: image.url,
            credits_left: image.credits_left,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(example = json!({ "credits": 7 })))]
#[derive(Debug, Clone, Serialize)]
pub struct CreditsResponse {
    pub credits: u64,
}
