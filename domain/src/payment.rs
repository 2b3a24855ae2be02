use std::fmt::{Display, Formatter, Result as FmtResult};

use time::OffsetDateTime;

use crate::auth::UserId;
use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Order terms sent to the payment provider. Amount is in minor currency
/// units (paise for INR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub amount_minor: u64,
    pub currency: String,
    pub receipt: String,
    pub user_id: UserId,
}

impl OrderDraft {
    pub fn new(
        user_id: UserId,
        amount_minor: u64,
        currency: impl Into<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            amount_minor,
            currency: currency.into(),
            receipt: receipt_token(now),
            user_id,
        }
    }
}

fn receipt_token(now: OffsetDateTime) -> String {
    format!("receipt_{}", now.unix_timestamp_nanos() / 1_000_000)
}

/// Order as acknowledged by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOrder {
    pub id: OrderId,
    pub amount_minor: u64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct PaymentVerification {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub signature: String,
    pub user_id: UserId,
}

impl PaymentVerification {
    pub fn new(
        order_id: &str,
        payment_id: &str,
        signature: &str,
        user_id: UserId,
    ) -> DomainResult<Self> {
        if order_id.is_empty() {
            return Err(DomainError::MissingField("orderId".to_string()));
        }
        if payment_id.is_empty() {
            return Err(DomainError::MissingField("paymentId".to_string()));
        }
        if signature.is_empty() {
            return Err(DomainError::MissingField("signature".to_string()));
        }

        Ok(Self {
            order_id: OrderId::new(order_id),
            payment_id: PaymentId::new(payment_id),
            signature: signature.to_string(),
            user_id,
        })
    }

    /// Message the provider signs: `<orderId>|<paymentId>`.
    pub fn signed_payload(&self) -> String {
        signed_payload(&self.order_id, &self.payment_id)
    }
}

pub fn signed_payload(order_id: &OrderId, payment_id: &PaymentId) -> String {
    format!("{}|{}", order_id.as_str(), payment_id.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub credits: u64,
    pub newly_granted: bool,
}
