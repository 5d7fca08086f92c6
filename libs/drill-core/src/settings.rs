//! User settings: defaults, validation, persistence and change observers.

use crate::answer::MatchingMode;
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::types::ExerciseKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;

/// Storage key of the settings blob.
pub const SETTINGS_KEY: &str = "settings";

pub const COUNT_RANGE: RangeInclusive<u32> = 1..=50;
pub const SORTING_CATEGORY_RANGE: RangeInclusive<u32> = 2..=6;
pub const FUZZY_THRESHOLD_RANGE: RangeInclusive<f64> = 0.5..=1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Default for Theme {
    fn default() -> Self {
        Self::System
    }
}

/// Level filter, stored as `"all"` or the level name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LevelFilter {
    All,
    Level(String),
}

impl LevelFilter {
    pub fn accepts(&self, level: &str) -> bool {
        match self {
            Self::All => true,
            Self::Level(wanted) => wanted == level,
        }
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        Self::All
    }
}

impl From<String> for LevelFilter {
    fn from(s: String) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Level(s)
        }
    }
}

impl From<LevelFilter> for String {
    fn from(filter: LevelFilter) -> Self {
        match filter {
            LevelFilter::All => "all".to_string(),
            LevelFilter::Level(level) => level,
        }
    }
}

/// Item-count limit per exercise kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeCounts {
    pub flashcard: u32,
    pub quiz: u32,
    pub completion: u32,
    pub sorting: u32,
    pub matching: u32,
}

impl Default for ModeCounts {
    fn default() -> Self {
        Self {
            flashcard: 20,
            quiz: 10,
            completion: 10,
            sorting: 10,
            matching: 6,
        }
    }
}

impl ModeCounts {
    pub fn for_kind(&self, kind: ExerciseKind) -> usize {
        let count = match kind {
            ExerciseKind::Flashcard => self.flashcard,
            ExerciseKind::Quiz => self.quiz,
            ExerciseKind::Completion => self.completion,
            ExerciseKind::Sorting => self.sorting,
            ExerciseKind::Matching => self.matching,
        };
        count as usize
    }

    fn clamped(self) -> Self {
        let clamp = |n: u32| n.clamp(*COUNT_RANGE.start(), *COUNT_RANGE.end());
        Self {
            flashcard: clamp(self.flashcard),
            quiz: clamp(self.quiz),
            completion: clamp(self.completion),
            sorting: clamp(self.sorting),
            matching: clamp(self.matching),
        }
    }
}

/// User-chosen settings, snapshotted by each session at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    /// Opaque language code; the core never interprets it.
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub level: LevelFilter,
    pub categories: Vec<String>,
    pub random_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub counts: ModeCounts,
    pub sorting_categories: u32,
    pub completion_matching: MatchingMode,
    pub fuzzy_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: "en".to_string(),
            display_name: None,
            level: LevelFilter::All,
            categories: Vec::new(),
            random_mode: true,
            seed: None,
            counts: ModeCounts::default(),
            sorting_categories: 3,
            completion_matching: MatchingMode::default(),
            fuzzy_threshold: 0.8,
        }
    }
}

impl Settings {
    /// Decode a stored blob deep-merged over the defaults.
    ///
    /// Missing, unparsable or ill-typed blobs fall back to defaults.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let stored: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "stored settings are not valid JSON, using defaults");
                return Self::default();
            }
        };

        let mut merged = match serde_json::to_value(Self::default()) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        merge_json(&mut merged, stored);

        match serde_json::from_value::<Self>(merged) {
            Ok(settings) => settings.validated(),
            Err(e) => {
                tracing::warn!(error = %e, "stored settings do not match schema, using defaults");
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values into their configured bounds.
    pub fn validated(mut self) -> Self {
        let counts = self.counts.clamped();
        if counts != self.counts {
            tracing::warn!(counts = ?self.counts, "clamping item counts");
            self.counts = counts;
        }

        let sorting = self
            .sorting_categories
            .clamp(*SORTING_CATEGORY_RANGE.start(), *SORTING_CATEGORY_RANGE.end());
        if sorting != self.sorting_categories {
            tracing::warn!(value = self.sorting_categories, "clamping sorting category count");
            self.sorting_categories = sorting;
        }

        let threshold = if self.fuzzy_threshold.is_nan() {
            *FUZZY_THRESHOLD_RANGE.end()
        } else {
            self.fuzzy_threshold
                .clamp(*FUZZY_THRESHOLD_RANGE.start(), *FUZZY_THRESHOLD_RANGE.end())
        };
        if threshold != self.fuzzy_threshold {
            tracing::warn!(value = self.fuzzy_threshold, "clamping fuzzy threshold");
            self.fuzzy_threshold = threshold;
        }

        self.display_name = self
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self
    }

    pub fn item_limit(&self, kind: ExerciseKind) -> usize {
        self.counts.for_kind(kind)
    }

    /// Overlay a partial settings object, then validate.
    pub fn merged(&self, patch: Value) -> Result<Self> {
        let mut value = serde_json::to_value(self)?;
        merge_json(&mut value, patch);
        Ok(serde_json::from_value::<Self>(value)?.validated())
    }
}

/// Recursively overlay `overlay` onto `base`; objects merge, everything else replaces.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Receives every settings change (language, theme, filters).
pub trait SettingsObserver: Send {
    fn settings_changed(&mut self, previous: &Settings, current: &Settings);
}

/// Current settings plus persistence and observers.
pub struct SettingsStore {
    current: Settings,
    observers: Vec<Box<dyn SettingsObserver>>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: settings.validated(),
            observers: Vec::new(),
        }
    }

    /// Load from storage; storage failures fall back to defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(SETTINGS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "could not read settings, using defaults");
                None
            }
        };
        Self::new(Settings::from_stored(raw.as_deref()))
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// Copy taken by a session at init; later changes do not reach it.
    pub fn snapshot(&self) -> Settings {
        self.current.clone()
    }

    pub fn subscribe(&mut self, observer: Box<dyn SettingsObserver>) {
        self.observers.push(observer);
    }

    /// Apply a change, validate, persist and notify observers.
    pub fn update<F>(&mut self, store: &mut dyn KeyValueStore, change: F) -> Result<&Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut next = self.current.clone();
        change(&mut next);
        self.replace(store, next)
    }

    pub fn replace(&mut self, store: &mut dyn KeyValueStore, settings: Settings) -> Result<&Settings> {
        let next = settings.validated();
        let raw = serde_json::to_string(&next)?;
        store.set(SETTINGS_KEY, &raw)?;

        let previous = std::mem::replace(&mut self.current, next);
        if previous != self.current {
            for observer in &mut self.observers {
                observer.settings_changed(&previous, &self.current);
            }
        }
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn missing_or_corrupt_storage_uses_defaults() {
        assert_eq!(Settings::from_stored(None), Settings::default());
        assert_eq!(Settings::from_stored(Some("{oops")), Settings::default());
        assert_eq!(
            Settings::from_stored(Some(r#"{"counts": "many"}"#)),
            Settings::default()
        );
    }

    #[test]
    fn stored_values_merge_over_defaults() {
        let settings = Settings::from_stored(Some(
            r#"{"language": "fr", "level": "A2", "counts": {"quiz": 15}}"#,
        ));
        assert_eq!(settings.language, "fr");
        assert_eq!(settings.level, LevelFilter::Level("A2".to_string()));
        assert_eq!(settings.counts.quiz, 15);
        assert_eq!(settings.counts.flashcard, ModeCounts::default().flashcard);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let settings = Settings::from_stored(Some(
            r#"{"counts": {"quiz": 0, "matching": 500}, "sorting_categories": 9, "fuzzy_threshold": 0.1}"#,
        ));
        assert_eq!(settings.counts.quiz, 1);
        assert_eq!(settings.counts.matching, 50);
        assert_eq!(settings.sorting_categories, 6);
        assert_eq!(settings.fuzzy_threshold, 0.5);
    }

    #[test]
    fn level_filter_serializes_as_string() {
        assert_eq!(serde_json::to_string(&LevelFilter::All).unwrap(), r#""all""#);
        let filter: LevelFilter = serde_json::from_str(r#""B1""#).unwrap();
        assert!(filter.accepts("B1"));
        assert!(!filter.accepts("A1"));
    }

    #[test]
    fn partial_patch_keeps_other_fields() {
        let current = Settings {
            language: "fr".to_string(),
            ..Settings::default()
        };
        let next = current
            .merged(serde_json::json!({"counts": {"matching": 99}, "theme": "dark"}))
            .unwrap();
        assert_eq!(next.language, "fr");
        assert_eq!(next.theme, Theme::Dark);
        assert_eq!(next.counts.matching, 50);
        assert!(current.merged(serde_json::json!({"random_mode": "yes"})).is_err());
    }

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl SettingsObserver for Recorder {
        fn settings_changed(&mut self, previous: &Settings, current: &Settings) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{}->{}", previous.language, current.language));
        }
    }

    #[test]
    fn update_persists_and_notifies() {
        let mut store = MemoryStore::new();
        let mut settings = SettingsStore::load(&store);
        let log = Arc::new(Mutex::new(Vec::new()));
        settings.subscribe(Box::new(Recorder(log.clone())));

        settings
            .update(&mut store, |s| s.language = "de".to_string())
            .unwrap();
        // Unchanged settings do not notify.
        settings
            .update(&mut store, |s| s.language = "de".to_string())
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["en->de".to_string()]);
        let reloaded = SettingsStore::load(&store);
        assert_eq!(reloaded.current().language, "de");
    }
}
