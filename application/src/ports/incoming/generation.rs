use crate::error::AppResult;
use domain::{
    auth::UserId,
    generation::{GeneratedImage, StagedUpload},
};

#[derive(Debug, Clone)]
pub struct GenerateImageCommand {
    pub user_id: UserId,
    pub style: Option<String>,
    pub upload: Option<StagedUpload>,
}

#[async_trait::async_trait]
pub trait GenerationUseCase: Send + Sync {
    /// Consumes one credit on success. The staged upload, if any, is
    /// discarded before this returns, whatever the outcome.
    async fn generate(&self, command: GenerateImageCommand) -> AppResult<GeneratedImage>;
}
