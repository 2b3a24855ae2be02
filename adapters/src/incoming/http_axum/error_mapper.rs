use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use stylist_application::error::AppError;

pub struct HttpError(pub AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        match app_error {
            AppError::Domain(_)
            | AppError::ValidationError { .. }
            | AppError::JsonError(_)
            | AppError::InvalidSignature
            | AppError::InsufficientCredits { .. }
            | AppError::MissingInput { .. }
            | AppError::PayloadTooLarge { .. } => {
                debug!("Client error response generated: {}", app_error);
            }
            _ => {
                error!("Server error response generated: {}", app_error);
            }
        }

        let (status_code, message) = match app_error {
            // Verification keeps the checkout client's `{success, message}` shape.
            AppError::InvalidSignature => {
                let body = json!({
                    "success": false,
                    "message": app_error.to_string()
                });
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }

            AppError::Domain(_) => (StatusCode::BAD_REQUEST, app_error.to_string()),

            AppError::MissingInput { message } => (StatusCode::BAD_REQUEST, message.clone()),

            AppError::ValidationError { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, app_error.to_string())
            }

            AppError::JsonError(_) => (StatusCode::BAD_REQUEST, "Invalid JSON format".to_string()),

            AppError::InsufficientCredits { .. } => {
                (StatusCode::FORBIDDEN, "No credits left".to_string())
            }

            AppError::PayloadTooLarge { message } => {
                (StatusCode::PAYLOAD_TOO_LARGE, message.clone())
            }

            AppError::PaymentProviderError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating payment order".to_string(),
            ),

            AppError::GenerationProviderError { message } => {
                let body = json!({
                    "ok": false,
                    "error": "Error generating image",
                    "details": message,
                    "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16()
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }

            AppError::ConfigError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),

            AppError::IoError(_)
            | AppError::UploadStorageError { .. }
            | AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let error_response = json!({
            "ok": false,
            "error": message,
            "status": status_code.as_u16()
        });

        (status_code, Json(error_response)).into_response()
    }
}

impl From<AppError> for HttpError {
    fn from(app_error: AppError) -> Self {
        HttpError(app_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = HttpError(error).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_signature_keeps_verification_shape() {
        let (status, body) = render(AppError::InvalidSignature).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "message": "Invalid payment signature" })
        );
    }

    #[tokio::test]
    async fn insufficient_credits_is_forbidden() {
        let (status, body) = render(AppError::InsufficientCredits {
            message: "required 1, available 0".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "No credits left");
        assert_eq!(body["status"], 403);
    }

    #[tokio::test]
    async fn generation_failure_exposes_provider_detail() {
        let (status, body) = render(AppError::GenerationProviderError {
            message: "model exploded".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error generating image");
        assert_eq!(body["details"], "model exploded");
    }

    #[tokio::test]
    async fn payment_provider_detail_is_not_leaked() {
        let (status, body) = render(AppError::PaymentProviderError {
            message: "Authentication failed for key rzp_live".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error creating payment order");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn missing_input_is_bad_request() {
        let (status, body) = render(AppError::MissingInput {
            message: "No file uploaded".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }
}
