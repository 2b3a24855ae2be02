use std::sync::Arc;

use crate::error::AppResult;
use domain::generation::{ImagePayload, StagedUpload};

/// Transient storage for uploads received in a single request.
#[async_trait::async_trait]
pub trait UploadStagingPort: Send + Sync {
    async fn begin(&self, media_type: &str) -> AppResult<StagedUpload>;

    async fn append(&self, upload: &StagedUpload, chunk: &[u8]) -> AppResult<()>;

    async fn load(&self, upload: &StagedUpload) -> AppResult<ImagePayload>;

    /// Best effort. Failures are logged, never returned.
    async fn discard(&self, upload: &StagedUpload);
}

pub type DynUploadStagingPort = Arc<dyn UploadStagingPort>;
