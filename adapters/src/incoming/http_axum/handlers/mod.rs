// keep public for OpenAPI docs
pub mod credits;
pub mod generation;
pub mod health;
pub mod payments;
