use std::sync::Arc;

use crate::{
    error::AppResult,
    ports::{incoming::credits::CreditQueryUseCase, outgoing::credit_ledger::DynCreditLedgerPort},
};
use domain::{auth::UserId, credits::CreditBalance};

pub struct CreditQueryService {
    ledger: DynCreditLedgerPort,
}

impl CreditQueryService {
    pub fn new(ledger: DynCreditLedgerPort) -> Self {
        Self { ledger }
    }
}

#[async_trait::async_trait]
impl CreditQueryUseCase for CreditQueryService {
    async fn credits_of(&self, user_id: &UserId) -> AppResult<CreditBalance> {
        self.ledger.balance_of(user_id).await
    }
}

pub type DynCreditQueryUseCase = Arc<dyn CreditQueryUseCase>;
