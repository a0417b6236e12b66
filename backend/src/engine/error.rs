use super::placeholder::UnresolvedPlaceholder;
use thiserror::Error;

/// Failure reported by one of the capability backends (sheet, drive, mail).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("PDF rendering failed: {0}")]
    Render(String),
    #[error("{0}")]
    Message(String),
}

/// Batch-level failure. Detected before any row is touched and reported as
/// a rejected `MergeReport`.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{0}")]
    Validation(String),
    #[error(
        "You are about to send {requested} emails, but only {remaining} remain for today. \
         Please reduce the number or wait for the quota to reset."
    )]
    QuotaExceeded { requested: usize, remaining: usize },
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl MergeError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        MergeError::Validation(message.into())
    }
}

/// Row-level failure. Never escapes the row: the processor turns it into an
/// error outcome and the batch moves on.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    UnresolvedPlaceholder(#[from] UnresolvedPlaceholder),
    #[error("Email address missing")]
    MissingRecipient,
    #[error("PDF not saved")]
    ExportFailure,
    #[error("Execution time limit reached")]
    Cancelled,
    #[error(transparent)]
    Backend(#[from] BackendError),
}
