use std::io;
use thiserror::Error;

use domain::error::DomainError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal server error")]
    InternalServerError,

    #[error("Payment provider error: {message}")]
    PaymentProviderError { message: String },

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Insufficient credits: {message}")]
    InsufficientCredits { message: String },

    #[error("Missing input: {message}")]
    MissingInput { message: String },

    #[error("Generation provider error: {message}")]
    GenerationProviderError { message: String },

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Upload storage error: {message}")]
    UploadStorageError { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
