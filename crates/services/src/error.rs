//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;

/// Errors emitted by `Outbox` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutboxError {
    #[error("reply transport failed: {0}")]
    Transport(String),
    #[error("outbox is closed")]
    Closed,
}

/// Errors emitted by `QuizEngine`.
///
/// User mistakes (unknown verbs, malformed answers) are replies, not errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Outbox(#[from] OutboxError),
}
