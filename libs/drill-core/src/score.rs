//! Session scores and the persisted score ledger.

use crate::error::Result;
use crate::store::{load_json, save_json, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GLOBAL_SCORE_KEY: &str = "score:global";
const MODULE_SCORE_PREFIX: &str = "score:module:";

/// Correct/incorrect tally for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScore {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionScore {
    pub fn new(correct: u32, incorrect: u32) -> Self {
        Self { correct, incorrect }
    }

    pub fn total(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Fraction correct; 0.0 before any answer.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct as f64 / total as f64,
        }
    }

    /// Record one evaluated answer and return the matching delta.
    pub fn record(&mut self, is_correct: bool) -> ScoreDelta {
        let delta = ScoreDelta::for_answer(is_correct);
        self.apply(delta);
        delta
    }

    pub fn apply(&mut self, delta: ScoreDelta) {
        self.correct = shift(self.correct, delta.correct);
        self.incorrect = shift(self.incorrect, delta.incorrect);
    }
}

fn shift(value: u32, by: i32) -> u32 {
    if by >= 0 {
        value.saturating_add(by.unsigned_abs())
    } else {
        value.saturating_sub(by.unsigned_abs())
    }
}

/// Signed change to a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub correct: i32,
    pub incorrect: i32,
}

impl ScoreDelta {
    pub fn for_answer(is_correct: bool) -> Self {
        if is_correct {
            Self { correct: 1, incorrect: 0 }
        } else {
            Self { correct: 0, incorrect: 1 }
        }
    }

    pub fn inverse(self) -> Self {
        Self {
            correct: -self.correct,
            incorrect: -self.incorrect,
        }
    }

    /// Delta that turns `from` into `to`.
    pub fn between(from: SessionScore, to: SessionScore) -> Self {
        Self {
            correct: to.correct as i32 - from.correct as i32,
            incorrect: to.incorrect as i32 - from.incorrect as i32,
        }
    }
}

/// Persisted totals across every session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalScore {
    pub correct: u64,
    pub incorrect: u64,
    pub cards_studied: u64,
    pub modules_completed: u64,
}

impl GlobalScore {
    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }
}

/// Best result and attempt count for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleRecord {
    pub attempts: u32,
    pub best: SessionScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<DateTime<Utc>>,
}

impl ModuleRecord {
    fn absorb(&mut self, score: SessionScore, at: DateTime<Utc>) {
        self.attempts += 1;
        let better = (score.accuracy(), score.correct) > (self.best.accuracy(), self.best.correct);
        if self.attempts == 1 || better {
            self.best = score;
        }
        self.last = Some(at);
    }
}

/// What a finished session contributes to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionResult {
    pub score: SessionScore,
    pub cards_studied: u32,
}

/// Accumulates the running session delta and commits it on completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreLedger {
    global: GlobalScore,
    modules: BTreeMap<String, ModuleRecord>,
    pending: SessionScore,
    dirty: Vec<String>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the global score; corrupt blobs fall back to zero.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let global = load_json::<GlobalScore>(store, GLOBAL_SCORE_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable global score");
            None
        });
        Self {
            global: global.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn global(&self) -> GlobalScore {
        self.global
    }

    /// Uncommitted score of the running session.
    pub fn pending(&self) -> SessionScore {
        self.pending
    }

    /// Per-module record, reading through to storage on first access.
    pub fn module_record(&mut self, store: &dyn KeyValueStore, module_id: &str) -> ModuleRecord {
        self.cached_record(store, module_id).clone()
    }

    fn cached_record(&mut self, store: &dyn KeyValueStore, module_id: &str) -> &mut ModuleRecord {
        self.modules.entry(module_id.to_string()).or_insert_with(|| {
            let key = module_key(module_id);
            load_json::<ModuleRecord>(store, &key)
                .unwrap_or_else(|e| {
                    tracing::warn!(module = module_id, error = %e, "discarding unreadable module record");
                    None
                })
                .unwrap_or_default()
        })
    }

    pub fn begin_session(&mut self) {
        self.pending = SessionScore::default();
    }

    /// Forward an incremental delta from an engine.
    pub fn record(&mut self, delta: ScoreDelta) {
        self.pending.apply(delta);
    }

    /// Replace the pending score wholesale (full re-evaluation).
    pub fn replace_pending(&mut self, score: SessionScore) {
        self.pending = score;
    }

    /// Drop the pending delta of an abandoned session.
    pub fn discard_pending(&mut self) {
        self.pending = SessionScore::default();
    }

    /// Fold the finished session into the global and module records.
    pub fn commit(
        &mut self,
        store: &dyn KeyValueStore,
        module_id: &str,
        result: SessionResult,
        at: DateTime<Utc>,
    ) -> ModuleRecord {
        self.global.correct += u64::from(result.score.correct);
        self.global.incorrect += u64::from(result.score.incorrect);
        self.global.cards_studied += u64::from(result.cards_studied);
        self.global.modules_completed += 1;
        self.pending = SessionScore::default();

        let record = self.cached_record(store, module_id);
        record.absorb(result.score, at);
        let record = record.clone();
        if !self.dirty.iter().any(|id| id == module_id) {
            self.dirty.push(module_id.to_string());
        }

        tracing::info!(
            module = module_id,
            correct = result.score.correct,
            incorrect = result.score.incorrect,
            attempts = record.attempts,
            "committed session score"
        );
        record
    }

    /// Write the global score and every touched module record.
    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> Result<()> {
        save_json(store, GLOBAL_SCORE_KEY, &self.global)?;
        for module_id in std::mem::take(&mut self.dirty) {
            if let Some(record) = self.modules.get(&module_id) {
                save_json(store, &module_key(&module_id), record)?;
            }
        }
        Ok(())
    }
}

fn module_key(module_id: &str) -> String {
    format!("{MODULE_SCORE_PREFIX}{module_id}")
}
