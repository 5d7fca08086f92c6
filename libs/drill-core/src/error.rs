//! Error types for drill-core.

use crate::types::ExerciseKind;
use thiserror::Error;

/// Result type alias using DrillError.
pub type Result<T> = std::result::Result<T, DrillError>;

/// Errors raised while loading content or starting an exercise.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unexpected payload shape for module {module}")]
    UnexpectedPayload { module: String },

    #[error("no {kind} exercises available")]
    NoExercises { kind: ExerciseKind },

    #[error("expected {expected} content, found {found}")]
    KindMismatch {
        expected: ExerciseKind,
        found: ExerciseKind,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Errors surfaced by a key-value persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
