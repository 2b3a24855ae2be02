pub mod credit_ledger_memory;
pub mod payment_record_memory;
