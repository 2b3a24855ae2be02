use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::UserId;
use domain::credits::CreditBalance;

/// Per-user credit balances. Each operation is atomic for a single user.
#[async_trait::async_trait]
pub trait CreditLedgerPort: Send + Sync {
    /// Adds `amount` credits, creating the entry at zero if needed.
    async fn grant(&self, user_id: &UserId, amount: u64) -> AppResult<CreditBalance>;

    /// Takes one credit or fails with `InsufficientCredits`, leaving the
    /// balance untouched.
    async fn try_debit(&self, user_id: &UserId) -> AppResult<CreditBalance>;

    /// Zero for unknown users. Never creates an entry.
    async fn balance_of(&self, user_id: &UserId) -> AppResult<CreditBalance>;
}

pub type DynCreditLedgerPort = Arc<dyn CreditLedgerPort>;
