//! Exercise state machines, one per exercise kind.
//!
//! Engines are pure: every input runs to completion synchronously and any
//! side effect (score forwarding, notifications) is queued as an
//! [`EngineEvent`] for the owning session to drain.

pub mod completion;
pub mod flashcard;
pub mod matching;
pub mod quiz;
pub mod sorting;

use crate::score::{ScoreDelta, SessionScore};
use crate::types::{ExerciseKind, MatchingPair};
use serde::Serialize;

pub use completion::CompletionEngine;
pub use flashcard::FlashcardEngine;
pub use matching::MatchingEngine;
pub use quiz::QuizEngine;
pub use sorting::SortingEngine;

/// Side effect requested by an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Incremental change for the ledger.
    Scored(ScoreDelta),
    /// Full re-evaluation replacing the running score.
    ScoreReplaced(SessionScore),
    Answered {
        correct: bool,
        /// Correct answer text, present when the answer was wrong.
        expected: Option<String>,
    },
    /// Transient error indicator; cleared by token after `duration_ms`.
    ErrorFlash { token: u64, duration_ms: u64 },
    Warning(EngineWarning),
    ModuleComplete(CompletionSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineWarning {
    /// Words still sitting in the pool when answers were checked.
    UnplacedWords(usize),
}

/// Payload of the module-complete event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSummary {
    pub kind: ExerciseKind,
    pub score: SessionScore,
    pub item_count: usize,
    /// Cards studied (flashcards only).
    pub cards_studied: u32,
    /// Matched pairs in match order (matching only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_pairs: Vec<MatchingPair>,
}

impl CompletionSummary {
    pub fn scored(kind: ExerciseKind, score: SessionScore, item_count: usize) -> Self {
        Self {
            kind,
            score,
            item_count,
            cards_studied: 0,
            matched_pairs: Vec::new(),
        }
    }
}

/// Common read surface of every engine.
pub trait ExerciseEngine {
    fn kind(&self) -> ExerciseKind;
    fn score(&self) -> SessionScore;
    fn is_complete(&self) -> bool;
    /// Drain queued events in emission order.
    fn take_events(&mut self) -> Vec<EngineEvent>;
}

macro_rules! impl_exercise_engine {
    ($ty:ty, $kind:expr) => {
        impl $crate::engine::ExerciseEngine for $ty {
            fn kind(&self) -> $crate::types::ExerciseKind {
                $kind
            }

            fn score(&self) -> $crate::score::SessionScore {
                self.score
            }

            fn is_complete(&self) -> bool {
                self.is_complete()
            }

            fn take_events(&mut self) -> Vec<$crate::engine::EngineEvent> {
                std::mem::take(&mut self.events)
            }
        }
    };
}

pub(crate) use impl_exercise_engine;
