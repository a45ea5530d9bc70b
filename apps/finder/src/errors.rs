use thiserror::Error;
use uuid::Uuid;

/// Application-level error type.
/// Anything that stops a command before or between batches ends up here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Precondition failures, rejected when the resolver is built.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("At least one provider must be configured")]
    NoProviders,

    #[error("Unknown provider '{0}' (expected one of: ashby, lever, gem)")]
    UnknownProvider(String),

    #[error("Provider '{0}' is listed more than once")]
    DuplicateProvider(String),

    #[error("Retry count must be at least 1")]
    ZeroRetries,

    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Environment variable '{key}' has an invalid value '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Errors raised by a record sink.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("A company with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("Company {0} not found")]
    NotFound(Uuid),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
