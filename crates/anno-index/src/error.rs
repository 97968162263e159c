//! Error types for the index crate.

/// Errors that can occur during index operations.
///
/// Every mutating operation validates first and returns one of these
/// before touching either map, so an error never leaves the index half
/// updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// An annotation with this id is already indexed.
    #[error("annotation already indexed: {0}")]
    DuplicateAnnotation(String),

    /// A body id is already owned by an annotation.
    #[error("body {body} already indexed under annotation {owner}")]
    DuplicateBody { body: String, owner: String },

    /// The annotation id is not indexed.
    #[error("annotation not found in index: {0}")]
    AnnotationNotFound(String),

    /// The secondary index names an owner whose body list lacks the body.
    #[error("store integrity error: body {body} indexed under {owner} but not present in it")]
    DanglingBody { body: String, owner: String },
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
