use std::sync::Arc;

use domain::payment::PaymentVerification;

pub trait SignatureVerifierPort: Send + Sync {
    fn verify(&self, verification: &PaymentVerification) -> bool;
}

pub type DynSignatureVerifierPort = Arc<dyn SignatureVerifierPort>;
