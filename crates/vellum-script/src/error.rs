//! Script-layer errors

use vellum_dom::TreeError;

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Collection operation errors.
///
/// Out-of-bounds *reads* are never errors; they produce the kind's
/// configured not-found value instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("index {index} out of range for structural edit (length {length})")]
    OutOfRange { index: i64, length: usize },

    #[error("collection kind does not support this structural edit")]
    UnsupportedEdit,

    #[error("collection handle no longer refers to a live collection")]
    StaleHandle,

    #[error(transparent)]
    Tree(#[from] TreeError),
}
