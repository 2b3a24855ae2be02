use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::error;

use domain::payment::PaymentVerification;
use stylist_application::ports::outgoing::signature_verifier::SignatureVerifierPort;

type HmacSha256 = Hmac<Sha256>;

const DIGEST_LEN: usize = 32;

/// Checks `hex(HMAC-SHA256(key_secret, "<orderId>|<paymentId>"))` against the
/// signature returned by the payment provider's checkout.
pub struct HmacSignatureVerifier {
    key_secret: SecretString,
}

impl HmacSignatureVerifier {
    pub fn new(key_secret: SecretString) -> Self {
        Self { key_secret }
    }

    fn mac_for(&self, payload: &str) -> Option<HmacSha256> {
        match HmacSha256::new_from_slice(self.key_secret.expose_secret().as_bytes()) {
            Ok(mut mac) => {
                mac.update(payload.as_bytes());
                Some(mac)
            }
            Err(e) => {
                error!(error = %e, "Payment key secret rejected by HMAC");
                None
            }
        }
    }

    /// Lowercase hex signature for `payload`, as the provider computes it.
    #[cfg(test)]
    fn sign(&self, payload: &str) -> Option<String> {
        self.mac_for(payload)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
    }
}

fn is_lower_hex(signature: &str) -> bool {
    signature.len() == DIGEST_LEN * 2
        && signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

impl SignatureVerifierPort for HmacSignatureVerifier {
    fn verify(&self, verification: &PaymentVerification) -> bool {
        let Some(mac) = self.mac_for(&verification.signed_payload()) else {
            return false;
        };

        // Only the canonical lowercase form is accepted. Anything else is
        // still run through the comparison against zeros.
        let canonical = is_lower_hex(&verification.signature);
        let provided = if canonical {
            hex::decode(&verification.signature).unwrap_or_else(|_| vec![0u8; DIGEST_LEN])
        } else {
            vec![0u8; DIGEST_LEN]
        };

        let matches = mac.verify_slice(&provided).is_ok();
        matches && canonical
    }
}
