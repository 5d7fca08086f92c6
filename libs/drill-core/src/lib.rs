//! Core exercise library for the language drills app.
//!
//! Provides:
//! - JSON content parsing for module catalogs and module data
//! - Level/category filtering of module items
//! - Exercise engines (flashcards, quiz, completion, sorting, matching)
//! - Sessions that forward engine events to the score ledger and notifier
//! - Settings and score persistence over a key-value store

pub mod answer;
pub mod content;
pub mod engine;
pub mod error;
pub mod filter;
pub mod history;
pub mod notify;
pub mod score;
pub mod session;
pub mod settings;
pub mod shuffle;
pub mod store;
pub mod types;

pub use answer::{compare_answers, word_diff, DiffSegment, DiffType, MatchResult, MatchingMode};
pub use content::{parse_module_data, parse_module_list};
pub use engine::{EngineEvent, ExerciseEngine};
pub use error::{DrillError, Result, StoreError};
pub use filter::{filter_content, filter_modules};
pub use notify::{NoticeKind, NoticeOptions, Notifier, Toast, ToastQueue};
pub use score::{GlobalScore, ModuleRecord, ScoreLedger, SessionScore};
pub use session::{Command, CommandOutcome, Exercise, Session, SessionContext};
pub use settings::{LevelFilter, Settings, SettingsObserver, SettingsStore, Theme};
pub use shuffle::SessionRng;
pub use store::{KeyValueStore, MemoryStore};
pub use types::{ExerciseKind, ModuleContent, ModuleItems, ModuleMeta};
