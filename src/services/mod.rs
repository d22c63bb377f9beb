use thiserror::Error;

use crate::repository::RepositoryError;

pub mod backup;
pub mod customers;
pub mod import;
pub mod orders;

/// Failures surfaced to whatever UI drives the services. Persistence
/// messages pass through verbatim; there is no retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The targeted record does not exist.
    #[error("not found")]
    NotFound,
    /// A form failed validation; the operation was aborted before any
    /// write.
    #[error("{0}")]
    Form(String),
    /// The spreadsheet import failed; the whole batch was rolled back.
    #[error("import failed: {0}")]
    Import(#[from] import::ImportError),
    /// Underlying repository failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

/// Result type returned by service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
