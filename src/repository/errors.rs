use thiserror::Error;

/// Failures surfaced by repository operations. Persistence errors carry
/// the underlying diesel message verbatim; callers roll back and report,
/// they do not retry.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The targeted record does not exist.
    #[error("record not found")]
    NotFound,
    /// Underlying database failure, including constraint violations.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// The pool could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// A direct (non-pooled) connection could not be opened.
    #[error("connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),
}

/// Result type returned by repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
