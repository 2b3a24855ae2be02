use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::{DomainError, DomainResult};

/// Number of generations a caller is entitled to. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CreditBalance {
    pub available: u64,
}

impl CreditBalance {
    pub fn new(available: u64) -> Self {
        Self { available }
    }

    pub fn can_afford_generation(&self) -> bool {
        self.available > 0
    }

    pub fn grant(&mut self, amount: u64) -> DomainResult<()> {
        if amount == 0 {
            return Err(DomainError::InvalidCreditAmount(
                "granted credits must be positive".to_string(),
            ));
        }

        self.available = self.available.saturating_add(amount);
        Ok(())
    }

    /// Takes exactly one credit. Refused, never clamped, on an empty balance.
    pub fn try_debit(&mut self) -> Result<(), InsufficientCreditsError> {
        if !self.can_afford_generation() {
            return Err(InsufficientCreditsError {
                available: self.available,
            });
        }

        self.available -= 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPricing {
    pub order_amount_minor: u64,
    pub credits_per_payment: u64,
}

impl CreditPricing {
    pub fn new(order_amount_minor: u64, credits_per_payment: u64) -> Self {
        Self {
            order_amount_minor,
            credits_per_payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientCreditsError {
    pub available: u64,
}

impl Display for InsufficientCreditsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Insufficient credits: required 1, available {}",
            self.available
        )
    }
}

impl Error for InsufficientCreditsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_balance_is_empty() {
        let balance = CreditBalance::default();
        assert_eq!(balance.available, 0);
        assert!(!balance.can_afford_generation());
    }

    #[test]
    fn grant_adds_to_prior_balance() {
        let mut balance = CreditBalance::new(3);
        balance.grant(7).unwrap();
        assert_eq!(balance.available, 10);
    }

    #[test]
    fn zero_grant_is_rejected() {
        let mut balance = CreditBalance::new(2);
        assert!(balance.grant(0).is_err());
        assert_eq!(balance.available, 2);
    }

    #[test]
    fn debit_on_empty_balance_is_refused_and_unchanged() {
        let mut balance = CreditBalance::default();
        let err = balance.try_debit().unwrap_err();
        assert_eq!(err.available, 0);
        assert_eq!(balance.available, 0);
    }

    #[test]
    fn debit_takes_exactly_one_credit() {
        let mut balance = CreditBalance::new(2);
        balance.try_debit().unwrap();
        assert_eq!(balance.available, 1);
        balance.try_debit().unwrap();
        assert_eq!(balance.available, 0);
        assert!(balance.try_debit().is_err());
    }
}
