//! Term/definition matching engine.

use super::{impl_exercise_engine, CompletionSummary, EngineEvent};
use crate::error::{DrillError, Result};
use crate::history::History;
use crate::score::{ScoreDelta, SessionScore};
use crate::shuffle::SessionRng;
use crate::types::{ExerciseKind, MatchingPair, PairId};
use serde::Serialize;
use std::collections::HashSet;

/// How long a failed attempt stays highlighted.
pub const ERROR_FLASH_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingState {
    Selecting,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Term,
    Definition,
}

/// The two selection slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub term: Option<PairId>,
    pub definition: Option<PairId>,
}

impl Selection {
    fn slot(&mut self, side: Side) -> &mut Option<PairId> {
        match side {
            Side::Term => &mut self.term,
            Side::Definition => &mut self.definition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub pair_id: PairId,
    /// Slots as they were before the click that completed the match.
    pub selection_before: Selection,
}

/// Items highlighted after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorFlash {
    pub token: u64,
    pub term: PairId,
    pub definition: PairId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Selected,
    Deselected,
    Matched(PairId),
    Mismatched { token: u64 },
}

#[derive(Debug, Clone)]
pub struct MatchingEngine {
    pairs: Vec<MatchingPair>,
    term_order: Vec<usize>,
    definition_order: Vec<usize>,
    locked: HashSet<PairId>,
    selection: Selection,
    matches: History<MatchRecord>,
    flash: Option<ErrorFlash>,
    next_token: u64,
    score: SessionScore,
    events: Vec<EngineEvent>,
}

impl MatchingEngine {
    /// Build the board with independently shuffled columns.
    pub fn new(pairs: Vec<MatchingPair>, rng: &mut SessionRng) -> Result<Self> {
        let mut seen = HashSet::new();
        let pairs: Vec<MatchingPair> = pairs
            .into_iter()
            .filter(|pair| {
                let fresh = seen.insert(pair.id.clone());
                if !fresh {
                    tracing::warn!(id = %pair.id, "dropping duplicate matching pair");
                }
                fresh
            })
            .collect();
        if pairs.is_empty() {
            return Err(DrillError::NoExercises {
                kind: ExerciseKind::Matching,
            });
        }

        let mut term_order: Vec<usize> = (0..pairs.len()).collect();
        let mut definition_order = term_order.clone();
        rng.shuffle(&mut term_order);
        rng.shuffle(&mut definition_order);

        Ok(Self {
            pairs,
            term_order,
            definition_order,
            locked: HashSet::new(),
            selection: Selection::default(),
            matches: History::new(),
            flash: None,
            next_token: 1,
            score: SessionScore::default(),
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> MatchingState {
        if self.is_complete() {
            MatchingState::Complete
        } else {
            MatchingState::Selecting
        }
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn is_complete(&self) -> bool {
        self.locked.len() == self.pairs.len()
    }

    /// Term column in display order.
    pub fn terms(&self) -> impl Iterator<Item = &MatchingPair> + '_ {
        self.term_order.iter().map(|&i| &self.pairs[i])
    }

    /// Definition column in display order.
    pub fn definitions(&self) -> impl Iterator<Item = &MatchingPair> + '_ {
        self.definition_order.iter().map(|&i| &self.pairs[i])
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.locked.contains(id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn flash(&self) -> Option<&ErrorFlash> {
        self.flash.as_ref()
    }

    /// Pairs in the order they were matched.
    pub fn matched_pairs(&self) -> Vec<MatchingPair> {
        self.matches
            .entries()
            .iter()
            .filter_map(|record| self.pair(&record.pair_id).cloned())
            .collect()
    }

    fn pair(&self, id: &str) -> Option<&MatchingPair> {
        self.pairs.iter().find(|pair| pair.id == id)
    }

    /// Toggle an item; a full selection triggers a match attempt.
    pub fn click(&mut self, side: Side, id: &str) -> ClickOutcome {
        if self.is_complete() || self.is_locked(id) || self.pair(id).is_none() {
            return ClickOutcome::Ignored;
        }

        // Acting on the board supersedes any pending flash.
        self.flash = None;
        let before = self.selection.clone();
        let slot = self.selection.slot(side);
        if slot.as_deref() == Some(id) {
            *slot = None;
            return ClickOutcome::Deselected;
        }
        *slot = Some(id.to_string());

        match (self.selection.term.clone(), self.selection.definition.clone()) {
            (Some(term), Some(definition)) => self.attempt(term, definition, before),
            _ => ClickOutcome::Selected,
        }
    }

    fn attempt(&mut self, term: PairId, definition: PairId, before: Selection) -> ClickOutcome {
        self.selection = Selection::default();
        let correct = term == definition;
        let delta = self.score.record(correct);
        self.events.push(EngineEvent::Scored(delta));

        if !correct {
            let token = self.next_token;
            self.next_token += 1;
            self.flash = Some(ErrorFlash {
                token,
                term,
                definition: definition.clone(),
            });
            let expected = self.pair(&definition).map(|pair| pair.term_text.clone());
            self.events.push(EngineEvent::Answered {
                correct: false,
                expected,
            });
            self.events.push(EngineEvent::ErrorFlash {
                token,
                duration_ms: ERROR_FLASH_MS,
            });
            return ClickOutcome::Mismatched { token };
        }

        self.locked.insert(term.clone());
        self.matches.push(MatchRecord {
            pair_id: term.clone(),
            selection_before: before,
        });
        self.events.push(EngineEvent::Answered {
            correct: true,
            expected: None,
        });

        if self.is_complete() {
            tracing::info!(pairs = self.pairs.len(), "matching exercise complete");
            self.events.push(EngineEvent::ModuleComplete(CompletionSummary {
                matched_pairs: self.matched_pairs(),
                ..CompletionSummary::scored(ExerciseKind::Matching, self.score, self.pairs.len())
            }));
        }
        ClickOutcome::Matched(term)
    }

    /// Timer callback; a flash replaced by a later attempt stays put.
    pub fn clear_flash(&mut self, token: u64) -> bool {
        match &self.flash {
            Some(flash) if flash.token == token => {
                self.flash = None;
                true
            }
            _ => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.is_complete() && !self.matches.is_empty()
    }

    /// Unlock the most recent match and restore the slots it consumed.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let Some(record) = self.matches.pop() else {
            return false;
        };
        self.locked.remove(&record.pair_id);
        let delta = ScoreDelta::for_answer(true).inverse();
        self.score.apply(delta);
        self.events.push(EngineEvent::Scored(delta));
        self.selection = record.selection_before;
        self.flash = None;
        true
    }
}

impl_exercise_engine!(MatchingEngine, ExerciseKind::Matching);
