use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::{AppError, AppResult};
use domain::credits::CreditPricing;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub payments: PaymentsConfig,
    pub inference: InferenceConfig,
    pub uploads: UploadConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    pub api_base_url: String,
    pub key_id: String,
    #[serde(serialize_with = "redact_secret", deserialize_with = "secret_from_string")]
    pub key_secret: SecretString,
    pub order_amount: u64,
    pub currency: String,
    pub credits_per_payment: u64,
    pub request_timeout_secs: u64,
}

impl PaymentsConfig {
    #[must_use]
    pub fn pricing(&self) -> CreditPricing {
        CreditPricing::new(self.order_amount, self.credits_per_payment)
    }

    #[must_use]
    pub fn key_secret(&self) -> &str {
        self.key_secret.expose_secret()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub api_base_url: String,
    #[serde(serialize_with = "redact_secret", deserialize_with = "secret_from_string")]
    pub api_token: SecretString,
    pub model_version: String,
    pub poll_interval_ms: u64,
    pub max_wait_secs: u64,
    pub request_timeout_secs: u64,
    pub default_media_type: String,
}

impl InferenceConfig {
    #[must_use]
    pub fn api_token(&self) -> &str {
        self.api_token.expose_secret()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub staging_dir: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

// Empty secrets serialize as-is so the serialized defaults stay empty.
fn redact_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if secret.expose_secret().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("[REDACTED]")
    }
}

fn secret_from_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::from(raw))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                cors_origin: None,
            },
            payments: PaymentsConfig {
                api_base_url: "https://api.razorpay.com".to_string(),
                key_id: String::new(),
                key_secret: SecretString::from(""),
                order_amount: 100,
                currency: "INR".to_string(),
                credits_per_payment: 7,
                request_timeout_secs: 15,
            },
            inference: InferenceConfig {
                api_base_url: "https://api.replicate.com".to_string(),
                api_token: SecretString::from(""),
                model_version:
                    "8d24e0e8f7b90e2a6a061b8f849f142fcbf1f73f83f44f83b6ee6a1fdaea9f7c"
                        .to_string(),
                poll_interval_ms: 1000,
                max_wait_secs: 300,
                request_timeout_secs: 60,
                default_media_type: "image/png".to_string(),
            },
            uploads: UploadConfig {
                staging_dir: "uploads".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(config_error("server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(config_error("server port must be greater than 0"));
        }

        self.validate_payments()?;
        self.validate_inference()?;

        if self.uploads.staging_dir.trim().is_empty() {
            return Err(config_error("upload staging_dir cannot be empty"));
        }

        if self.uploads.max_upload_bytes == 0 {
            return Err(config_error("max_upload_bytes must be greater than 0"));
        }

        Ok(())
    }

    fn validate_payments(&self) -> AppResult<()> {
        let payments = &self.payments;

        validate_base_url("payments api_base_url", &payments.api_base_url)?;

        if payments.key_id.trim().is_empty() {
            return Err(config_error("payments key_id cannot be empty"));
        }

        if payments.key_secret().is_empty() {
            return Err(config_error("payments key_secret cannot be empty"));
        }

        if payments.order_amount == 0 {
            return Err(config_error("order_amount must be greater than 0"));
        }

        if payments.currency.trim().is_empty() {
            return Err(config_error("currency cannot be empty"));
        }

        if payments.credits_per_payment == 0 {
            return Err(config_error("credits_per_payment must be greater than 0"));
        }

        if payments.request_timeout_secs == 0 {
            return Err(config_error(
                "payments request_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }

    fn validate_inference(&self) -> AppResult<()> {
        let inference = &self.inference;

        validate_base_url("inference api_base_url", &inference.api_base_url)?;

        if inference.api_token().is_empty() {
            return Err(config_error("inference api_token cannot be empty"));
        }

        if inference.model_version.trim().is_empty() {
            return Err(config_error("inference model_version cannot be empty"));
        }

        if inference.poll_interval_ms == 0 {
            return Err(config_error("poll_interval_ms must be greater than 0"));
        }

        if inference.max_wait_secs == 0 {
            return Err(config_error("max_wait_secs must be greater than 0"));
        }

        if inference.request_timeout_secs == 0 {
            return Err(config_error(
                "inference request_timeout_secs must be greater than 0",
            ));
        }

        if !inference.default_media_type.starts_with("image/") {
            return Err(config_error("default_media_type must be an image/* type"));
        }

        Ok(())
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn validate_base_url(name: &str, value: &str) -> AppResult<()> {
    Url::parse(value).map_err(|e| AppError::ConfigError {
        message: format!("{name} is not a valid URL: {e}"),
    })?;
    Ok(())
}

fn config_error(message: &str) -> AppError {
    AppError::ConfigError {
        message: message.to_string(),
    }
}
