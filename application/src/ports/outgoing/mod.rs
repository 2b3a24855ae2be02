pub mod credit_ledger;
pub mod inference_provider;
pub mod payment_gateway;
pub mod payment_record;
pub mod signature_verifier;
pub mod task_spawn;
pub mod upload_staging;
