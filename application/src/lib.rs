#[cfg(any(
    feature = "adapters",
    feature = "axum",
    feature = "reqwest",
    feature = "dashmap"
))]
compile_error!("application must not depend on adapters/framework crates");

pub mod credits;
pub mod error;
pub mod generation;
pub mod infrastructure_config;
pub mod payments;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;
