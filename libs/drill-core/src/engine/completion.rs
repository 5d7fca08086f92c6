//! Sentence completion engine.
//!
//! Each item scores at most once. Revisiting an answered index is a
//! read-only lookup of its stored record, so there is no replay mode.

use super::{impl_exercise_engine, CompletionSummary, EngineEvent};
use crate::answer::{compare_answers, word_diff, DiffSegment, MatchingMode};
use crate::error::{DrillError, Result};
use crate::history::History;
use crate::score::{ScoreDelta, SessionScore};
use crate::types::{CompletionItem, ExerciseKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompletionState {
    Answering { index: usize },
    Answered { index: usize },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub matching_mode: MatchingMode,
    pub fuzzy_threshold: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            matching_mode: MatchingMode::CaseInsensitive,
            fuzzy_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRecord {
    pub item_index: usize,
    pub user_response: String,
    pub correct_response: String,
    pub is_correct: bool,
    pub similarity: f64,
    pub score_before: SessionScore,
    pub delta: ScoreDelta,
    /// Word diff against the correct answer; empty when correct.
    pub diff: Vec<DiffSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionView<'a> {
    pub item_index: usize,
    pub total: usize,
    pub before_blank: &'a str,
    pub after_blank: &'a str,
    pub tip: Option<&'a str>,
    /// Present once answered; the input is read-only from then on.
    pub answer: Option<&'a CompletionRecord>,
    pub explanation: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct CompletionEngine {
    items: Vec<CompletionItem>,
    index: usize,
    complete: bool,
    history: History<CompletionRecord>,
    score: SessionScore,
    options: CompletionOptions,
    events: Vec<EngineEvent>,
}

impl CompletionEngine {
    pub fn new(items: Vec<CompletionItem>, options: CompletionOptions) -> Result<Self> {
        if items.is_empty() {
            return Err(DrillError::NoExercises {
                kind: ExerciseKind::Completion,
            });
        }
        Ok(Self {
            items,
            index: 0,
            complete: false,
            history: History::new(),
            score: SessionScore::default(),
            options,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> CompletionState {
        if self.complete {
            CompletionState::Complete
        } else if self.record_for(self.index).is_some() {
            CompletionState::Answered { index: self.index }
        } else {
            CompletionState::Answering { index: self.index }
        }
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn history(&self) -> &History<CompletionRecord> {
        &self.history
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn record_for(&self, index: usize) -> Option<&CompletionRecord> {
        self.history.find_last(|record| record.item_index == index)
    }

    pub fn view(&self) -> Option<CompletionView<'_>> {
        if self.complete {
            return None;
        }
        let item = &self.items[self.index];
        let (before_blank, after_blank) = item
            .split_prompt()
            .unwrap_or((item.prompt_template.as_str(), ""));
        let answer = self.record_for(self.index);
        Some(CompletionView {
            item_index: self.index,
            total: self.items.len(),
            before_blank,
            after_blank,
            tip: item.tip.as_deref(),
            answer,
            explanation: answer.and(item.explanation.as_deref()),
        })
    }

    /// Check a typed answer; blank input and answered items are ignored.
    pub fn submit_answer(&mut self, text: &str) -> Option<&CompletionRecord> {
        if self.complete || text.trim().is_empty() || self.record_for(self.index).is_some() {
            return None;
        }

        let item = &self.items[self.index];
        let result = compare_answers(
            text,
            &item.correct_answer,
            self.options.matching_mode,
            self.options.fuzzy_threshold,
        );
        let diff = if result.is_correct {
            Vec::new()
        } else {
            word_diff(&result.typed_normalized, &result.correct_normalized)
        };

        let score_before = self.score;
        let delta = self.score.record(result.is_correct);
        self.events.push(EngineEvent::Scored(delta));
        self.events.push(EngineEvent::Answered {
            correct: result.is_correct,
            expected: (!result.is_correct).then(|| item.correct_answer.clone()),
        });

        self.history.push(CompletionRecord {
            item_index: self.index,
            user_response: result.typed_normalized,
            correct_response: item.correct_answer.clone(),
            is_correct: result.is_correct,
            similarity: result.similarity,
            score_before,
            delta,
            diff,
        });
        self.history.last()
    }

    /// Move forward; unanswered items may be skipped. The last item completes.
    pub fn next(&mut self) -> bool {
        if self.complete {
            return false;
        }
        if self.index + 1 < self.items.len() {
            self.index += 1;
        } else {
            self.complete = true;
            tracing::info!(correct = self.score.correct, incorrect = self.score.incorrect, "completion exercise complete");
            self.events.push(EngineEvent::ModuleComplete(CompletionSummary::scored(
                ExerciseKind::Completion,
                self.score,
                self.items.len(),
            )));
        }
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.complete || self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.complete
            && self
                .history
                .last()
                .is_some_and(|record| record.item_index == self.index)
    }

    /// Retract the newest answer if it belongs to the item on screen.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let Some(record) = self.history.pop() else {
            return false;
        };
        let inverse = record.delta.inverse();
        self.score.apply(inverse);
        self.events.push(EngineEvent::Scored(inverse));
        true
    }
}

impl_exercise_engine!(CompletionEngine, ExerciseKind::Completion);
