use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use domain::{
    auth::UserId,
    generation::{StagedUpload, resolve_media_type},
};
use stylist_application::{
    error::AppError,
    ports::incoming::{
        credits::CreditQueryUseCase,
        generation::{GenerateImageCommand, GenerationUseCase},
    },
    ports::outgoing::upload_staging::DynUploadStagingPort,
};

use crate::incoming::http_axum::{
    core::extractors::Caller, dto::responses::GenerateImageResponse, error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::{
    common_responses::{
        BadRequestResponse, ForbiddenResponse, PayloadTooLargeResponse,
        ValidationErrorResponse,
    },
    requests::GenerateImageForm,
    responses::ApiResponseValue,
};

const IMAGE_FIELD: &str = "image";
const STYLE_FIELD: &str = "style";

/// Owns an upload while the multipart body is still streaming in. Dropped
/// while holding one, it discards the file on a spawned task.
struct StagingGuard {
    staging: DynUploadStagingPort,
    upload: Option<StagedUpload>,
}

impl StagingGuard {
    fn new(staging: &DynUploadStagingPort) -> Self {
        Self {
            staging: Arc::clone(staging),
            upload: None,
        }
    }

    async fn discard(&mut self) {
        if let Some(upload) = &self.upload {
            self.staging.discard(upload).await;
        }
        self.upload = None;
    }

    /// Hands the upload over to the caller, who becomes responsible for it.
    fn release(mut self) -> Option<StagedUpload> {
        self.upload.take()
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        let Some(upload) = self.upload.take() else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            warn!(upload_id = %upload.id, "No runtime to discard abandoned upload");
            return;
        };

        debug!(upload_id = %upload.id, "Request dropped mid-upload, discarding staged file");
        let staging = Arc::clone(&self.staging);
        handle.spawn(async move {
            staging.discard(&upload).await;
        });
    }
}

struct GenerateForm {
    style: Option<String>,
    upload: StagingGuard,
}

fn multipart_error(e: &MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            message: e.body_text(),
        }
    } else {
        AppError::ValidationError {
            message: format!("Malformed multipart body: {}", e.body_text()),
        }
    }
}

async fn collect_fields(
    state: &AppState,
    multipart: &mut Multipart,
    form: &mut GenerateForm,
) -> Result<(), AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) if form.upload.upload.is_none() => {
                let media_type = resolve_media_type(
                    field.content_type(),
                    &state.config.inference.default_media_type,
                );
                let upload = state.upload_staging.begin(&media_type).await?;
                form.upload.upload = Some(upload.clone());

                while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(&e))? {
                    state.upload_staging.append(&upload, &chunk).await?;
                }
            }
            Some(STYLE_FIELD) => {
                form.style = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            }
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    Ok(())
}

/// Stages the image while the body streams in. On failure the partially
/// staged upload is discarded here, since the service never sees it.
async fn read_generate_form(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<GenerateForm, AppError> {
    let mut form = GenerateForm {
        style: None,
        upload: StagingGuard::new(&state.upload_staging),
    };

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "Request carries no multipart form");
            return Ok(form);
        }
    };

    if let Err(e) = collect_fields(state, &mut multipart, &mut form).await {
        form.upload.discard().await;
        return Err(e);
    }

    Ok(form)
}

/// Refuses callers without credits before any of the body is read. The
/// service still reserves atomically; this only spares the upload.
async fn ensure_credits(state: &AppState, user_id: &UserId) -> Result<(), AppError> {
    let credits_uc: &dyn CreditQueryUseCase = &*state.credit_query_service;
    if credits_uc.credits_of(user_id).await?.can_afford_generation() {
        return Ok(());
    }

    info!(user_id = %user_id, "Generation refused before upload, no credits left");
    Err(AppError::InsufficientCredits {
        message: format!("No credits left for user {user_id}"),
    })
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/api/generate",
    params(
        ("user-id" = Option<String>, Header, description = "Caller identifier, defaults to \"default\"")
    ),
    request_body(content = GenerateImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = GenerateImageResponse),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, description = "Generation failed, provider detail in `details`", body = ApiResponseValue)
    ),
    tag = "generation",
    summary = "Generate a styled image",
    description = "Spends one credit to restyle the uploaded image. The credit is refunded when the provider fails or no image is uploaded. A caller without credits gets 403 before the upload is read.",
    operation_id = "generate_image"
))]
pub async fn generate_image(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateImageResponse>, HttpError> {
    ensure_credits(&state, &user_id).await.map_err(HttpError)?;

    let form = read_generate_form(&state, multipart)
        .await
        .map_err(HttpError)?;

    // From here the service owns the upload and its cleanup.
    let command = GenerateImageCommand {
        user_id,
        style: form.style,
        upload: form.upload.release(),
    };

    let generation_uc: &dyn GenerationUseCase = &*state.generation_service;
    let image = generation_uc.generate(command).await.map_err(HttpError)?;

    Ok(Json(image.into()))
}
