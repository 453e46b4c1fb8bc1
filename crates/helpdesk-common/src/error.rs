//! Error types for the helpdesk core

use thiserror::Error;

/// Failure reported by an external collaborator (store, directory, catalog)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Backing store could not be reached
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Store rejected or failed the query
    #[error("query failed: {0}")]
    Query(String),
}

/// Typed outcome of a visibility request.
///
/// These are the only failure modes that cross the engine boundary; callers
/// map them onto their own transport (HTTP status codes and the like).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisibilityError {
    /// The actor could not be resolved
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The actor is known but may not use the requested filter
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A filter value is malformed and has no safe default
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator failed; no partial result was produced
    #[error("internal error: {0}")]
    Internal(String),
}

impl VisibilityError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<RepositoryError> for VisibilityError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration document
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values parsed but are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for visibility requests
pub type VisibilityResult<T> = Result<T, VisibilityError>;

/// Result type for collaborator calls
pub type RepoResult<T> = Result<T, RepositoryError>;
