use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use domain::auth::UserId;

pub const USER_ID_HEADER: &str = "user-id";

/// Caller identity as asserted by the `user-id` header, `"default"` when
/// absent. Never rejects.
#[derive(Debug, Clone)]
pub struct Caller(pub UserId);

impl Caller {
    pub fn from_parts(parts: &Parts) -> Self {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        Self(UserId::from_header(header))
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
