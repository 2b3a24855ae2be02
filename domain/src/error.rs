use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid credit amount: {0}")]
    InvalidCreditAmount(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
