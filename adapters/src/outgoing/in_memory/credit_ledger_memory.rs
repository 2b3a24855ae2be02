use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{debug, instrument};

use domain::auth::UserId;
use domain::credits::CreditBalance;
use stylist_application::{
    error::{AppError, AppResult},
    ports::outgoing::credit_ledger::CreditLedgerPort,
};

/// Process-lifetime ledger. Every operation runs under the shard lock of the
/// user's entry, so check-and-decrement is atomic per user.
#[derive(Default)]
pub struct InMemoryCreditLedger {
    balances: DashMap<UserId, CreditBalance>,
}

impl InMemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CreditLedgerPort for InMemoryCreditLedger {
    #[instrument(skip(self))]
    async fn grant(&self, user_id: &UserId, amount: u64) -> AppResult<CreditBalance> {
        let balance = match self.balances.entry(user_id.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().grant(amount)?;
                *occupied.get()
            }
            Entry::Vacant(vacant) => {
                let mut fresh = CreditBalance::default();
                fresh.grant(amount)?;
                *vacant.insert(fresh)
            }
        };

        debug!("Granted {} credits to {}, balance {}", amount, user_id, balance.available);
        Ok(balance)
    }

    #[instrument(skip(self))]
    async fn try_debit(&self, user_id: &UserId) -> AppResult<CreditBalance> {
        let Some(mut entry) = self.balances.get_mut(user_id) else {
            return Err(AppError::InsufficientCredits {
                message: format!("No credits left for user {user_id}"),
            });
        };

        entry
            .try_debit()
            .map_err(|err| AppError::InsufficientCredits {
                message: format!("{err} for user {user_id}"),
            })?;
        let balance = *entry;
        drop(entry);

        debug!("Debited 1 credit from {}, balance {}", user_id, balance.available);
        Ok(balance)
    }

    async fn balance_of(&self, user_id: &UserId) -> AppResult<CreditBalance> {
        Ok(self
            .balances
            .get(user_id)
            .map(|entry| *entry)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_user_has_zero_and_is_not_created() {
        let ledger = InMemoryCreditLedger::new();
        let balance = ledger.balance_of(&UserId::new("ghost")).await.unwrap();
        assert_eq!(balance.available, 0);
        assert!(ledger.balances.is_empty());
    }

    #[tokio::test]
    async fn grant_then_balance_returns_sum() {
        let ledger = InMemoryCreditLedger::new();
        let alice = UserId::new("alice");

        ledger.grant(&alice, 7).await.unwrap();
        assert_eq!(ledger.balance_of(&alice).await.unwrap().available, 7);

        ledger.grant(&alice, 3).await.unwrap();
        assert_eq!(ledger.balance_of(&alice).await.unwrap().available, 10);
    }

    #[tokio::test]
    async fn zero_grant_leaves_no_entry() {
        let ledger = InMemoryCreditLedger::new();
        assert!(ledger.grant(&UserId::new("alice"), 0).await.is_err());
        assert!(ledger.balances.is_empty());
    }

    #[tokio::test]
    async fn debit_refused_on_empty_balance() {
        let ledger = InMemoryCreditLedger::new();
        let bob = UserId::new("bob");

        let err = ledger.try_debit(&bob).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientCredits { .. }));
        assert_eq!(ledger.balance_of(&bob).await.unwrap().available, 0);
    }

    #[tokio::test]
    async fn debit_takes_exactly_one() {
        let ledger = InMemoryCreditLedger::new();
        let alice = UserId::new("alice");
        ledger.grant(&alice, 2).await.unwrap();

        assert_eq!(ledger.try_debit(&alice).await.unwrap().available, 1);
        assert_eq!(ledger.try_debit(&alice).await.unwrap().available, 0);
        assert!(ledger.try_debit(&alice).await.is_err());
        assert_eq!(ledger.balance_of(&alice).await.unwrap().available, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_debits_never_overspend() {
        let ledger = Arc::new(InMemoryCreditLedger::new());
        let alice = UserId::new("alice");
        ledger.grant(&alice, 10).await.unwrap();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let alice = alice.clone();
                tokio::spawn(async move { ledger.try_debit(&alice).await.is_ok() })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(ledger.balance_of(&alice).await.unwrap().available, 0);
    }
}
