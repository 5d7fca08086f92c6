//! Flashcard engine: flip and page through cards, no scoring.

use super::{impl_exercise_engine, CompletionSummary, EngineEvent};
use crate::error::{DrillError, Result};
use crate::score::SessionScore;
use crate::types::{ExerciseKind, FlashcardItem};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Front,
    Back,
}

impl Face {
    fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlashcardState {
    Viewing { index: usize, face: Face },
    Complete,
}

#[derive(Debug, Clone)]
pub struct FlashcardEngine {
    items: Vec<FlashcardItem>,
    index: usize,
    face: Face,
    complete: bool,
    // Always zero; flashcards only report a studied tally.
    score: SessionScore,
    events: Vec<EngineEvent>,
}

impl FlashcardEngine {
    pub fn new(items: Vec<FlashcardItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(DrillError::NoExercises {
                kind: ExerciseKind::Flashcard,
            });
        }
        Ok(Self {
            items,
            index: 0,
            face: Face::Front,
            complete: false,
            score: SessionScore::default(),
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> FlashcardState {
        if self.complete {
            FlashcardState::Complete
        } else {
            FlashcardState::Viewing {
                index: self.index,
                face: self.face,
            }
        }
    }

    pub fn current(&self) -> &FlashcardItem {
        &self.items[self.index]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn flip(&mut self) -> bool {
        if self.complete {
            return false;
        }
        self.face = self.face.flipped();
        true
    }

    /// Advance; on the last card, report completion and stay put.
    pub fn next(&mut self) -> bool {
        if self.complete {
            return false;
        }
        if self.index + 1 < self.items.len() {
            self.index += 1;
            self.face = Face::Front;
        } else {
            self.complete = true;
            let studied = self.items.len();
            tracing::info!(studied, "flashcards complete");
            self.events.push(EngineEvent::ModuleComplete(CompletionSummary {
                cards_studied: u32::try_from(studied).unwrap_or(u32::MAX),
                ..CompletionSummary::scored(ExerciseKind::Flashcard, self.score, studied)
            }));
        }
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.complete || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.face = Face::Front;
        true
    }
}

impl_exercise_engine!(FlashcardEngine, ExerciseKind::Flashcard);
