//! Error types for store operations.
//!
//! Only hard failures are errors. Operations on missing annotations or
//! bodies are soft failures: they log a warning and return an empty result.

use anno_index::IndexError;

/// Hard failures of store operations. The store is unchanged when one of
/// these is returned.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An annotation with this id already exists.
    #[error("cannot add annotation {id}: exists already")]
    DuplicateId { id: String },

    /// A non-replacing bulk add would overwrite existing annotations.
    #[error("bulk insert would overwrite the following annotations: {}", .ids.join(", "))]
    BulkOverwrite { ids: Vec<String> },

    /// A body update tried to move the body to a different annotation.
    #[error(
        "annotation integrity violation: body {body} belongs to {expected}, update names {actual}"
    )]
    IntegrityViolation {
        body: String,
        expected: String,
        actual: String,
    },

    /// A body id is already in use somewhere in the store.
    #[error("body id {body} already in use by annotation {owner}")]
    DuplicateBodyId { body: String, owner: String },

    /// An observer recursed into the store too deeply.
    #[error("observer reentrancy depth {depth} reached limit {limit}")]
    ReentrancyLimit { depth: usize, limit: usize },

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Unexpected index failure.
    #[error(transparent)]
    Index(IndexError),
}

impl From<IndexError> for StoreError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::DuplicateAnnotation(id) => Self::DuplicateId { id },
            IndexError::DuplicateBody { body, owner } => Self::DuplicateBodyId { body, owner },
            other => Self::Index(other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
