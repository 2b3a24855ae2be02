use std::sync::Arc;

use crate::error::AppResult;
use domain::payment::{OrderDraft, PaymentOrder};

#[async_trait::async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn create_order(&self, draft: &OrderDraft) -> AppResult<PaymentOrder>;
}

pub type DynPaymentGatewayPort = Arc<dyn PaymentGatewayPort>;
