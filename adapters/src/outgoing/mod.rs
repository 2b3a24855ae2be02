pub mod hmac_sha2;
pub mod in_memory;
pub mod razorpay_reqwest;
pub mod replicate_reqwest;
pub mod tokio_fs;
pub mod tokio_spawn;
