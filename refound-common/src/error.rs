//! Common error types for Refound

use thiserror::Error;

/// Common result type for Refound operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Refound workspace
///
/// Lifecycle operations surface `NotFound` / `Forbidden` / `Conflict` as
/// precise, distinguishable rejections. Capability failures (scorer, vision)
/// are contained near their call sites and never reach callers as `Upstream`
/// unless a component explicitly chooses to propagate one.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Acting user is not a party to the entity
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation already performed (e.g. duplicate confirmation)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External capability failure (scorer, vision, delivery)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for the rejection variants a caller can act on directly
    /// (as opposed to infrastructure failures).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Forbidden(_) | Error::Conflict(_) | Error::InvalidInput(_)
        )
    }
}
