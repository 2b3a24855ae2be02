use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    ports::{
        incoming::payments::PaymentUseCase,
        outgoing::{
            credit_ledger::DynCreditLedgerPort, payment_gateway::DynPaymentGatewayPort,
            payment_record::DynPaymentRecordPort, signature_verifier::DynSignatureVerifierPort,
        },
    },
};
use domain::{
    auth::UserId,
    credits::CreditPricing,
    payment::{OrderDraft, PaymentOrder, PaymentVerification, VerifiedPayment},
};

pub struct PaymentServiceDeps {
    pub gateway: DynPaymentGatewayPort,
    pub verifier: DynSignatureVerifierPort,
    pub records: DynPaymentRecordPort,
    pub ledger: DynCreditLedgerPort,
}

pub struct PaymentService {
    gateway: DynPaymentGatewayPort,
    verifier: DynSignatureVerifierPort,
    records: DynPaymentRecordPort,
    ledger: DynCreditLedgerPort,
    pricing: CreditPricing,
    currency: String,
}

impl PaymentService {
    pub fn new(deps: PaymentServiceDeps, pricing: CreditPricing, currency: String) -> Self {
        Self {
            gateway: deps.gateway,
            verifier: deps.verifier,
            records: deps.records,
            ledger: deps.ledger,
            pricing,
            currency,
        }
    }
}

#[async_trait::async_trait]
impl PaymentUseCase for PaymentService {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn create_order(&self, user_id: UserId) -> AppResult<PaymentOrder> {
        let draft = OrderDraft::new(
            user_id,
            self.pricing.order_amount_minor,
            self.currency.clone(),
            OffsetDateTime::now_utc(),
        );

        let order = self.gateway.create_order(&draft).await?;

        info!(
            order_id = %order.id,
            receipt = %draft.receipt,
            amount = order.amount_minor,
            currency = %order.currency,
            "Payment order created"
        );

        Ok(order)
    }

    #[instrument(
        skip(self, verification),
        fields(order_id = %verification.order_id, user_id = %verification.user_id)
    )]
    async fn verify_payment(
        &self,
        verification: PaymentVerification,
    ) -> AppResult<VerifiedPayment> {
        if !self.verifier.verify(&verification) {
            warn!("Rejected payment with invalid signature");
            return Err(AppError::InvalidSignature);
        }

        let previous = self
            .records
            .record_if_new(&verification.order_id, &verification.user_id)
            .await?;

        if let Some(credited_user) = previous {
            if credited_user == verification.user_id {
                info!("Payment already verified, no credits granted");
            } else {
                warn!(
                    credited_user = %credited_user,
                    "Replayed payment for a different user, no credits granted"
                );
            }

            let balance = self.ledger.balance_of(&verification.user_id).await?;
            return Ok(VerifiedPayment {
                credits: balance.available,
                newly_granted: false,
            });
        }

        let balance = self
            .ledger
            .grant(&verification.user_id, self.pricing.credits_per_payment)
            .await?;

        info!(
            granted = self.pricing.credits_per_payment,
            credits = balance.available,
            "Payment verified and credits granted"
        );

        Ok(VerifiedPayment {
            credits: balance.available,
            newly_granted: true,
        })
    }
}

pub type DynPaymentUseCase = Arc<dyn PaymentUseCase>;
