//! Multiple-choice quiz engine.
//!
//! States: `Answering(index)` → `Answered(index)` → next question or
//! `SessionComplete`. `prev` enters `ReplayingHistory(pointer)`, a
//! read-only walk over past answers during which the score is frozen.
//! Walking `next` past the newest entry unfreezes and resumes live play.

use super::{impl_exercise_engine, CompletionSummary, EngineEvent};
use crate::error::{DrillError, Result};
use crate::history::History;
use crate::score::{ScoreDelta, SessionScore};
use crate::shuffle::SessionRng;
use crate::types::{ExerciseKind, QuizItem};
use serde::Serialize;

/// Number of options reachable from the keyboard.
pub const KEYBOARD_OPTIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizState {
    Answering { index: usize },
    Answered { index: usize },
    ReplayingHistory { pointer: usize },
    SessionComplete,
}

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizRecord {
    pub item_index: usize,
    pub selected: usize,
    pub user_response: String,
    pub correct_response: String,
    pub is_correct: bool,
    pub score_before: SessionScore,
    /// Change applied to the score; `None` when the score was frozen.
    pub delta: Option<ScoreDelta>,
    /// Options in the order they were rendered, for faithful replay.
    pub option_order: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOptions {
    pub shuffle_options: bool,
}

/// Keys the presentation layer forwards to the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKey {
    Digit(u8),
    Letter(char),
    Enter,
    Backspace,
    ArrowLeft,
}

/// What to draw for the current position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizView<'a> {
    pub item_index: usize,
    pub total: usize,
    pub prompt: &'a str,
    pub options: &'a [String],
    pub explanation: Option<&'a str>,
    pub answer: Option<&'a QuizRecord>,
    pub replaying: bool,
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    items: Vec<QuizItem>,
    layouts: Vec<Vec<String>>,
    state: QuizState,
    history: History<QuizRecord>,
    score: SessionScore,
    frozen: bool,
    events: Vec<EngineEvent>,
}

impl QuizEngine {
    pub fn new(items: Vec<QuizItem>, options: QuizOptions, rng: &mut SessionRng) -> Result<Self> {
        if items.is_empty() {
            return Err(DrillError::NoExercises {
                kind: ExerciseKind::Quiz,
            });
        }

        let layouts = items
            .iter()
            .map(|item| {
                let mut layout = item.options.clone();
                if options.shuffle_options {
                    rng.shuffle(&mut layout);
                }
                layout
            })
            .collect();

        Ok(Self {
            items,
            layouts,
            state: QuizState::Answering { index: 0 },
            history: History::new(),
            score: SessionScore::default(),
            frozen: false,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn history(&self) -> &History<QuizRecord> {
        &self.history
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self.state, QuizState::ReplayingHistory { .. })
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_complete(&self) -> bool {
        self.state == QuizState::SessionComplete
    }

    /// Undo only applies to the answered question currently on screen.
    pub fn can_undo(&self) -> bool {
        match self.state {
            QuizState::Answered { index } => self
                .history
                .last()
                .is_some_and(|record| record.item_index == index),
            _ => false,
        }
    }

    pub fn view(&self) -> Option<QuizView<'_>> {
        let (item_index, options, answer) = match self.state {
            QuizState::Answering { index } => (index, self.layouts[index].as_slice(), None),
            QuizState::Answered { index } => {
                let answer = self.history.find_last(|r| r.item_index == index);
                (index, self.layouts[index].as_slice(), answer)
            }
            QuizState::ReplayingHistory { pointer } => {
                let record = self.history.get(pointer)?;
                (record.item_index, record.option_order.as_slice(), Some(record))
            }
            QuizState::SessionComplete => return None,
        };
        let item = &self.items[item_index];
        Some(QuizView {
            item_index,
            total: self.items.len(),
            prompt: &item.prompt_text,
            options,
            explanation: answer.and(item.explanation.as_deref()),
            answer,
            replaying: self.is_replaying(),
        })
    }

    /// Answer the current question with the option at `option_index` (as rendered).
    pub fn submit_answer(&mut self, option_index: usize) -> Option<&QuizRecord> {
        let QuizState::Answering { index } = self.state else {
            tracing::debug!(state = ?self.state, "ignoring answer outside answering state");
            return None;
        };
        let layout = &self.layouts[index];
        let selected = layout.get(option_index)?.clone();
        let item = &self.items[index];
        let is_correct = selected == item.correct_option;

        let score_before = self.score;
        let delta = if self.frozen {
            None
        } else {
            let delta = self.score.record(is_correct);
            self.events.push(EngineEvent::Scored(delta));
            Some(delta)
        };
        self.events.push(EngineEvent::Answered {
            correct: is_correct,
            expected: (!is_correct).then(|| item.correct_option.clone()),
        });

        self.history.push(QuizRecord {
            item_index: index,
            selected: option_index,
            user_response: selected,
            correct_response: item.correct_option.clone(),
            is_correct,
            score_before,
            delta,
            option_order: layout.clone(),
        });
        self.state = QuizState::Answered { index };
        self.history.last()
    }

    pub fn next(&mut self) -> bool {
        match self.state {
            QuizState::Answered { index } => {
                self.advance_from(index);
                true
            }
            QuizState::ReplayingHistory { pointer } => {
                if pointer + 1 < self.history.len() {
                    self.history.seek(pointer + 1);
                    self.state = QuizState::ReplayingHistory {
                        pointer: pointer + 1,
                    };
                } else {
                    self.frozen = false;
                    self.history.seek_end();
                    match self.history.last().map(|r| r.item_index) {
                        Some(last) => self.advance_from(last),
                        None => self.state = QuizState::Answering { index: 0 },
                    }
                }
                true
            }
            QuizState::Answering { .. } | QuizState::SessionComplete => false,
        }
    }

    /// Step back into history; a no-op on the first question.
    pub fn prev(&mut self) -> bool {
        let shown = match self.state {
            QuizState::Answering { index } | QuizState::Answered { index } => index,
            QuizState::ReplayingHistory { pointer } => match self.history.get(pointer) {
                Some(record) => record.item_index,
                None => return false,
            },
            QuizState::SessionComplete => return false,
        };
        let Some(target) = shown.checked_sub(1) else {
            return false;
        };
        let Some(pointer) = self.history.rposition(|r| r.item_index == target) else {
            return false;
        };

        self.frozen = true;
        self.history.seek(pointer);
        self.state = QuizState::ReplayingHistory { pointer };
        true
    }

    /// Retract the answer on screen and restore its score.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let QuizState::Answered { index } = self.state else {
            return false;
        };
        let Some(record) = self.history.pop() else {
            return false;
        };
        if let Some(delta) = record.delta {
            let inverse = delta.inverse();
            self.score.apply(inverse);
            self.events.push(EngineEvent::Scored(inverse));
        }
        self.state = QuizState::Answering { index };
        true
    }

    /// Keys 1-4 / a-d answer while answering, Enter advances, Backspace/Left go back.
    pub fn handle_key(&mut self, key: QuizKey) -> bool {
        match key {
            QuizKey::Digit(digit) => match (digit as usize).checked_sub(1) {
                Some(option) if option < KEYBOARD_OPTIONS => self.submit_answer(option).is_some(),
                _ => false,
            },
            QuizKey::Letter(letter) => {
                let letter = letter.to_ascii_lowercase();
                match letter {
                    'a'..='d' => self.submit_answer(letter as usize - 'a' as usize).is_some(),
                    _ => false,
                }
            }
            QuizKey::Enter => self.next(),
            QuizKey::Backspace | QuizKey::ArrowLeft => self.prev(),
        }
    }

    fn advance_from(&mut self, index: usize) {
        if index + 1 < self.items.len() {
            self.state = QuizState::Answering { index: index + 1 };
        } else {
            self.state = QuizState::SessionComplete;
            tracing::info!(correct = self.score.correct, incorrect = self.score.incorrect, "quiz complete");
            self.events.push(EngineEvent::ModuleComplete(CompletionSummary::scored(
                ExerciseKind::Quiz,
                self.score,
                self.items.len(),
            )));
        }
    }
}

impl_exercise_engine!(QuizEngine, ExerciseKind::Quiz);
