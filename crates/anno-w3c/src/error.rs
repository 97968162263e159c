use thiserror::Error;

/// Errors produced while converting to or from W3C records.
#[derive(Debug, Error)]
pub enum W3cError {
    /// The store model holds exactly one target per annotation.
    #[error("annotation {id} has {count} targets, only one is supported")]
    MultipleTargets { id: String, count: usize },

    #[error("annotation {id} has no target")]
    MissingTarget { id: String },

    #[error("annotation {id} has an unusable target: {reason}")]
    InvalidTarget { id: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for W3C crosswalk results.
pub type W3cResult<T> = Result<T, W3cError>;
