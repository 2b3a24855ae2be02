use crate::error::AppResult;
use domain::{auth::UserId, credits::CreditBalance};

#[async_trait::async_trait]
pub trait CreditQueryUseCase: Send + Sync {
    async fn credits_of(&self, user_id: &UserId) -> AppResult<CreditBalance>;
}
