use std::time::Duration;

use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use domain::generation::{GenerationInput, GenerationOutput};
use stylist_application::{
    error::{AppError, AppResult},
    ports::outgoing::inference_provider::InferenceProviderPort,
};

#[derive(Clone)]
pub struct ReplicateConfig {
    pub api_base_url: String,
    pub api_token: SecretString,
    pub model_version: String,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub request_timeout: Duration,
}

/// Runs an image-to-image model through the Replicate predictions API and
/// polls the prediction until it settles.
pub struct ReplicateInferenceProvider {
    client: Client,
    base_url: Url,
    api_token: SecretString,
    model_version: String,
    poll_interval: Duration,
    max_wait: Duration,
}

#[derive(Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    image: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Aborted,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    output: Option<GenerationOutput>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct ProblemDetail {
    detail: Option<String>,
}

fn provider_error(message: impl Into<String>) -> AppError {
    AppError::GenerationProviderError {
        message: message.into(),
    }
}

impl Prediction {
    fn failure_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => format!("Prediction {} ended as {:?}", self.id, self.status),
            Some(other) => other.to_string(),
        }
    }
}

impl ReplicateInferenceProvider {
    pub fn new(config: ReplicateConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| AppError::ConfigError {
            message: format!("Invalid inference api_base_url: {e}"),
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::ConfigError {
                message: format!("Failed to build inference HTTP client: {e}"),
            })?;

        info!(
            base_url = %base_url,
            model_version = %config.model_version,
            max_wait_secs = config.max_wait.as_secs(),
            "Replicate inference provider initialized"
        );

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token,
            model_version: config.model_version,
            poll_interval: config.poll_interval,
            max_wait: config.max_wait,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| provider_error(format!("Invalid prediction URL: {e}")))
    }

    async fn read_prediction(response: Response) -> AppResult<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ProblemDetail>()
                .await
                .ok()
                .and_then(|problem| problem.detail)
                .unwrap_or_else(|| status.to_string());
            error!(status = %status, detail = %detail, "Inference provider rejected request");
            return Err(provider_error(detail));
        }

        response
            .json()
            .await
            .map_err(|e| provider_error(format!("Malformed prediction response: {e}")))
    }

    async fn create_prediction(&self, input: &GenerationInput) -> AppResult<Prediction> {
        let body = CreatePrediction {
            version: &self.model_version,
            input: PredictionInput {
                prompt: &input.prompt,
                image: &input.image_data_uri,
            },
        };

        let response = self
            .client
            .post(self.endpoint("v1/predictions")?)
            .bearer_auth(self.api_token.expose_secret())
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to reach inference provider: {e}")))?;

        Self::read_prediction(response).await
    }

    async fn fetch_prediction(&self, id: &str) -> AppResult<Prediction> {
        let response = self
            .client
            .get(self.endpoint(&format!("v1/predictions/{id}"))?)
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to poll prediction: {e}")))?;

        Self::read_prediction(response).await
    }
}

#[async_trait::async_trait]
impl InferenceProviderPort for ReplicateInferenceProvider {
    #[instrument(skip(self, input), fields(prompt = %input.prompt))]
    async fn generate(&self, input: &GenerationInput) -> AppResult<GenerationOutput> {
        let deadline = Instant::now() + self.max_wait;
        let mut prediction = self.create_prediction(input).await?;

        loop {
            match prediction.status {
                PredictionStatus::Succeeded => {
                    info!(prediction_id = %prediction.id, "Prediction succeeded");
                    return prediction
                        .output
                        .ok_or_else(|| provider_error("Provider returned no output"));
                }
                PredictionStatus::Failed | PredictionStatus::Canceled | PredictionStatus::Aborted => {
                    let message = prediction.failure_message();
                    warn!(prediction_id = %prediction.id, error = %message, "Prediction did not succeed");
                    return Err(provider_error(message));
                }
                PredictionStatus::Starting
                | PredictionStatus::Processing
                | PredictionStatus::Unknown => {}
            }

            if Instant::now() >= deadline {
                warn!(prediction_id = %prediction.id, "Gave up waiting for prediction");
                return Err(provider_error(format!(
                    "Prediction {} did not finish within {}s",
                    prediction.id,
                    self.max_wait.as_secs()
                )));
            }

            debug!(prediction_id = %prediction.id, status = ?prediction.status, "Polling prediction");
            sleep(self.poll_interval).await;
            prediction = self.fetch_prediction(&prediction.id).await?;
        }
    }
}
