use std::sync::Arc;

use crate::error::AppResult;
use domain::generation::{GenerationInput, GenerationOutput};

#[async_trait::async_trait]
pub trait InferenceProviderPort: Send + Sync {
    async fn generate(&self, input: &GenerationInput) -> AppResult<GenerationOutput>;
}

pub type DynInferenceProviderPort = Arc<dyn InferenceProviderPort>;
