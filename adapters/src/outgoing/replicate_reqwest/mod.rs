pub mod inference_replicate;
