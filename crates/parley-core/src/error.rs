use parley_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The referenced message does not exist, or the caller does not own it.
    #[error("message not found")]
    NotFound,

    /// The underlying store rejected a read or write. Surfaced directly,
    /// never retried.
    #[error(transparent)]
    Persistence(#[from] DbError),

    /// A lower-level failure while building a display record. Wraps rather
    /// than swallows; the caller decides the user-facing behavior.
    #[error("failed to build display record: {0}")]
    Projection(#[source] Box<ChatError>),
}
