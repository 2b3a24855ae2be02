use crate::error::AppResult;
use domain::{
    auth::UserId,
    payment::{PaymentOrder, PaymentVerification, VerifiedPayment},
};

#[async_trait::async_trait]
pub trait PaymentUseCase: Send + Sync {
    async fn create_order(&self, user_id: UserId) -> AppResult<PaymentOrder>;

    async fn verify_payment(&self, verification: PaymentVerification)
    -> AppResult<VerifiedPayment>;
}
