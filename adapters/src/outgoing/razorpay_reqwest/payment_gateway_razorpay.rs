use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use url::Url;

use domain::payment::{OrderDraft, OrderId, PaymentOrder};
use stylist_application::{
    error::{AppError, AppResult},
    ports::outgoing::payment_gateway::PaymentGatewayPort,
};

#[derive(Clone)]
pub struct RazorpayConfig {
    pub api_base_url: String,
    pub key_id: String,
    pub key_secret: SecretString,
    pub request_timeout: Duration,
}

/// Creates orders through the Razorpay Orders API using basic auth.
pub struct RazorpayPaymentGateway {
    client: Client,
    orders_url: Url,
    key_id: String,
    key_secret: SecretString,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    notes: OrderNotes<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderNotes<'a> {
    user_id: &'a str,
}

#[derive(Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: u64,
    currency: String,
}

#[derive(Deserialize)]
struct RazorpayErrorEnvelope {
    error: RazorpayErrorBody,
}

#[derive(Deserialize)]
struct RazorpayErrorBody {
    description: Option<String>,
}

fn provider_error(message: String) -> AppError {
    AppError::PaymentProviderError { message }
}

impl RazorpayPaymentGateway {
    pub fn new(config: RazorpayConfig) -> AppResult<Self> {
        let orders_url = Url::parse(&config.api_base_url)
            .and_then(|base| base.join("v1/orders"))
            .map_err(|e| AppError::ConfigError {
                message: format!("Invalid payments api_base_url: {e}"),
            })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::ConfigError {
                message: format!("Failed to build payment HTTP client: {e}"),
            })?;

        info!(
            orders_url = %orders_url,
            key_id = %config.key_id,
            "Razorpay payment gateway initialized"
        );

        Ok(Self {
            client,
            orders_url,
            key_id: config.key_id,
            key_secret: config.key_secret,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGatewayPort for RazorpayPaymentGateway {
    #[instrument(skip(self, draft), fields(receipt = %draft.receipt))]
    async fn create_order(&self, draft: &OrderDraft) -> AppResult<PaymentOrder> {
        let body = CreateOrderBody {
            amount: draft.amount_minor,
            currency: &draft.currency,
            receipt: &draft.receipt,
            notes: OrderNotes {
                user_id: draft.user_id.as_str(),
            },
        };

        let response = self
            .client
            .post(self.orders_url.clone())
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Payment provider unreachable");
                provider_error(format!("Failed to reach payment provider: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<RazorpayErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.description)
                .unwrap_or_else(|| status.to_string());
            error!(status = %status, detail = %detail, "Payment provider rejected order");
            return Err(provider_error(format!("Order creation rejected: {detail}")));
        }

        let order: RazorpayOrder = response
            .json()
            .await
            .map_err(|e| provider_error(format!("Malformed order response: {e}")))?;

        Ok(PaymentOrder {
            id: OrderId::new(order.id),
            amount_minor: order.amount,
            currency: order.currency,
        })
    }
}
