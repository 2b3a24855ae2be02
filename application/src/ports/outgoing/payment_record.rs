use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::payment::OrderId;

/// Idempotency record of orders that already granted credits.
#[async_trait::async_trait]
pub trait PaymentRecordPort: Send + Sync {
    /// Atomically records `order_id` as credited to `user_id`. Returns the
    /// user it was already credited to when the order was seen before.
    async fn record_if_new(&self, order_id: &OrderId, user_id: &UserId)
    -> AppResult<Option<UserId>>;
}

pub type DynPaymentRecordPort = Arc<dyn PaymentRecordPort>;
