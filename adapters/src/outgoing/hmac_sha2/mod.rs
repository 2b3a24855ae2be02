pub mod signature_verifier_hmac;
