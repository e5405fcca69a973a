use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("upstream dial failed: {0}")]
    DialFailed(String),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid rule pattern: {0}")]
    InvalidPattern(String),
}

impl From<sqlx::Error> for DomainError {
    fn from(e: sqlx::Error) -> Self {
        DomainError::DatabaseError(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
