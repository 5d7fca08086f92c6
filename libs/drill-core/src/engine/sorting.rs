//! Word sorting engine.
//!
//! Words start in the pool and are moved between containers freely. A check
//! re-evaluates every placement from scratch; nothing is scored per move.

use super::{impl_exercise_engine, CompletionSummary, EngineEvent, EngineWarning};
use crate::error::{DrillError, Result};
use crate::history::History;
use crate::score::SessionScore;
use crate::shuffle::SessionRng;
use crate::types::{ExerciseKind, SortingCategory, SortingWord};
use serde::Serialize;

/// Index into the engine's selected words.
pub type WordId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "container", content = "id", rename_all = "snake_case")]
pub enum Container {
    Pool,
    Category(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortingState {
    Arranging,
    Checked,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortingOptions {
    pub category_count: usize,
    pub word_count: usize,
}

impl Default for SortingOptions {
    fn default() -> Self {
        Self {
            category_count: 3,
            word_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortMove {
    pub word: WordId,
    pub from: Container,
    pub to: Container,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// First step after a check: feedback hidden, placements untouched.
    FeedbackCleared,
    MoveReverted(SortMove),
    Nothing,
}

/// Result of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortingCheck {
    pub score: SessionScore,
    pub unplaced: usize,
    pub all_correct: bool,
}

/// Target container shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortingBin {
    pub category_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct SortingEngine {
    bins: Vec<SortingBin>,
    words: Vec<SortingWord>,
    placement: Vec<Container>,
    // Per-word verdict of the last check; meaningful only while Checked.
    verdicts: Vec<bool>,
    moves: History<SortMove>,
    state: SortingState,
    score: SessionScore,
    events: Vec<EngineEvent>,
}

impl SortingEngine {
    /// Pick the categories and words for one round.
    ///
    /// Every chosen category contributes one word before the remaining
    /// slots are topped up from the leftover pool.
    pub fn new(
        categories: Vec<SortingCategory>,
        options: SortingOptions,
        rng: &mut SessionRng,
    ) -> Result<Self> {
        let mut categories: Vec<SortingCategory> = categories
            .into_iter()
            .filter(|category| !category.items.is_empty())
            .collect();
        if categories.is_empty() || options.word_count == 0 {
            return Err(DrillError::NoExercises {
                kind: ExerciseKind::Sorting,
            });
        }

        rng.shuffle(&mut categories);
        categories.truncate(options.category_count.max(1));

        let bins = categories
            .iter()
            .map(|category| SortingBin {
                category_id: category.category_id.clone(),
                display_name: category.display_name.clone(),
            })
            .collect();

        let mut pools: Vec<Vec<SortingWord>> =
            categories.into_iter().map(|category| category.items).collect();
        let mut words = Vec::with_capacity(options.word_count);
        for pool in pools.iter_mut() {
            if words.len() == options.word_count {
                break;
            }
            if let Some(word) = rng.take_one(pool) {
                words.push(word);
            }
        }

        let mut leftover: Vec<SortingWord> = pools.into_iter().flatten().collect();
        while words.len() < options.word_count {
            match rng.take_one(&mut leftover) {
                Some(word) => words.push(word),
                None => break,
            }
        }
        rng.shuffle(&mut words);

        tracing::debug!(
            words = words.len(),
            requested = options.word_count,
            "selected sorting words"
        );

        let count = words.len();
        Ok(Self {
            bins,
            words,
            placement: vec![Container::Pool; count],
            verdicts: vec![false; count],
            moves: History::new(),
            state: SortingState::Arranging,
            score: SessionScore::default(),
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> SortingState {
        self.state
    }

    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn is_complete(&self) -> bool {
        self.state == SortingState::Complete
    }

    pub fn bins(&self) -> &[SortingBin] {
        &self.bins
    }

    pub fn words(&self) -> &[SortingWord] {
        &self.words
    }

    pub fn word(&self, word: WordId) -> Option<&SortingWord> {
        self.words.get(word)
    }

    pub fn placement(&self, word: WordId) -> Option<&Container> {
        self.placement.get(word)
    }

    pub fn words_in(&self, container: &Container) -> Vec<WordId> {
        self.placement
            .iter()
            .enumerate()
            .filter(|(_, placed)| *placed == container)
            .map(|(word, _)| word)
            .collect()
    }

    /// Check verdict for a word; `None` unless feedback is showing.
    pub fn verdict(&self, word: WordId) -> Option<bool> {
        match self.state {
            SortingState::Arranging => None,
            SortingState::Checked | SortingState::Complete => self.verdicts.get(word).copied(),
        }
    }

    pub fn moves(&self) -> &History<SortMove> {
        &self.moves
    }

    fn is_target(&self, container: &Container) -> bool {
        match container {
            Container::Pool => true,
            Container::Category(id) => self.bins.iter().any(|bin| &bin.category_id == id),
        }
    }

    /// Move a word between containers. Moving after a check hides feedback.
    pub fn move_word(&mut self, word: WordId, from: Container, to: Container) -> bool {
        if self.is_complete() || from == to || !self.is_target(&to) {
            return false;
        }
        match self.placement.get(word) {
            Some(current) if *current == from => {}
            _ => return false,
        }

        if self.state == SortingState::Checked {
            self.state = SortingState::Arranging;
        }
        self.placement[word] = to.clone();
        self.moves.push(SortMove { word, from, to });
        true
    }

    /// Drop a touch-dragged word onto whichever zone contains the release point.
    pub fn drop_word(&mut self, drag: TouchDrag, zones: &[DropZone]) -> bool {
        match drag.release(zones) {
            Some(SortMove { word, from, to }) => self.move_word(word, from, to),
            None => false,
        }
    }

    /// Re-score every word against its current container.
    pub fn check_answers(&mut self) -> Option<SortingCheck> {
        if self.is_complete() {
            return None;
        }

        let mut score = SessionScore::default();
        let mut unplaced = 0;
        for (index, word) in self.words.iter().enumerate() {
            let verdict = match &self.placement[index] {
                Container::Pool => {
                    unplaced += 1;
                    false
                }
                Container::Category(id) => {
                    let correct = *id == word.category_id;
                    if correct {
                        score.correct += 1;
                    } else {
                        score.incorrect += 1;
                    }
                    correct
                }
            };
            self.verdicts[index] = verdict;
        }

        self.score = score;
        self.events.push(EngineEvent::ScoreReplaced(score));
        if unplaced > 0 {
            self.events.push(EngineEvent::Warning(EngineWarning::UnplacedWords(unplaced)));
        }

        let all_correct = unplaced == 0 && score.incorrect == 0;
        if all_correct {
            self.state = SortingState::Complete;
            tracing::info!(words = self.words.len(), "sorting exercise complete");
            self.events.push(EngineEvent::ModuleComplete(CompletionSummary::scored(
                ExerciseKind::Sorting,
                score,
                self.words.len(),
            )));
        } else {
            self.state = SortingState::Checked;
        }

        Some(SortingCheck {
            score,
            unplaced,
            all_correct,
        })
    }

    pub fn can_undo(&self) -> bool {
        match self.state {
            SortingState::Checked => true,
            SortingState::Arranging => !self.moves.is_empty(),
            SortingState::Complete => false,
        }
    }

    /// Clear check feedback first; only the next call reverts a move.
    pub fn undo(&mut self) -> UndoOutcome {
        match self.state {
            SortingState::Complete => UndoOutcome::Nothing,
            SortingState::Checked => {
                self.state = SortingState::Arranging;
                UndoOutcome::FeedbackCleared
            }
            SortingState::Arranging => match self.moves.pop() {
                Some(mv) => {
                    self.placement[mv.word] = mv.from.clone();
                    UndoOutcome::MoveReverted(mv)
                }
                None => UndoOutcome::Nothing,
            },
        }
    }
}

impl_exercise_engine!(SortingEngine, ExerciseKind::Sorting);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Container bounds as laid out by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropZone {
    pub container: Container,
    pub bounds: Rect,
}

/// Touch-emulated drag of one word: press, move, release.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchDrag {
    word: WordId,
    from: Container,
    position: Point,
}

impl TouchDrag {
    pub fn press(word: WordId, from: Container, at: Point) -> Self {
        Self {
            word,
            from,
            position: at,
        }
    }

    pub fn move_to(&mut self, at: Point) {
        self.position = at;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Hit-test the release point; later zones sit on top of earlier ones.
    pub fn release(self, zones: &[DropZone]) -> Option<SortMove> {
        let zone = zones.iter().rev().find(|zone| zone.bounds.contains(self.position))?;
        if zone.container == self.from {
            return None;
        }
        Some(SortMove {
            word: self.word,
            from: self.from,
            to: zone.container.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ExerciseEngine;
    use pretty_assertions::assert_eq;

    fn category(id: &str, words: &[&str]) -> SortingCategory {
        SortingCategory {
            category_id: id.to_string(),
            display_name: id.to_uppercase(),
            items: words
                .iter()
                .map(|word| SortingWord {
                    word: word.to_string(),
                    category_id: id.to_string(),
                    level: None,
                })
                .collect(),
        }
    }

    fn animals_and_food() -> Vec<SortingCategory> {
        vec![
            category("animals", &["chat", "chien", "loup"]),
            category("food", &["pain", "fromage", "pomme"]),
        ]
    }

    fn engine(word_count: usize, seed: u64) -> SortingEngine {
        SortingEngine::new(
            animals_and_food(),
            SortingOptions {
                category_count: 2,
                word_count,
            },
            &mut SessionRng::seeded(seed),
        )
        .unwrap()
    }

    fn place_all_correctly(engine: &mut SortingEngine) {
        for id in 0..engine.words().len() {
            let target = Container::Category(engine.words()[id].category_id.clone());
            engine.move_word(id, Container::Pool, target);
        }
    }

    #[test]
    fn every_selected_category_is_represented() {
        for seed in 0..50 {
            let engine = engine(4, seed);
            assert_eq!(engine.words().len(), 4);
            for id in ["animals", "food"] {
                assert!(
                    engine.words().iter().any(|w| w.category_id == id),
                    "seed {seed} missing {id}"
                );
            }
        }
    }

    #[test]
    fn word_count_caps_at_pool_size() {
        assert_eq!(engine(20, 3).words().len(), 6);
    }

    #[test]
    fn check_is_idempotent() {
        let mut engine = engine(4, 9);
        let target = Container::Category("animals".to_string());
        engine.move_word(0, Container::Pool, target.clone());
        engine.move_word(1, Container::Pool, target);

        let first = engine.check_answers().unwrap();
        let second = engine.check_answers().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.unplaced, 2);
        assert_eq!(first.score.total(), 2);
    }

    #[test]
    fn check_replaces_score_and_warns() {
        let mut engine = engine(4, 2);
        engine.check_answers();
        let events = engine.take_events();
        assert_eq!(
            events,
            vec![
                EngineEvent::ScoreReplaced(SessionScore::default()),
                EngineEvent::Warning(EngineWarning::UnplacedWords(4)),
            ]
        );
        assert_eq!(engine.state(), SortingState::Checked);
    }

    #[test]
    fn undo_clears_feedback_before_moves() {
        let mut engine = engine(4, 5);
        engine.move_word(0, Container::Pool, Container::Category("food".to_string()));
        engine.check_answers();

        assert_eq!(engine.undo(), UndoOutcome::FeedbackCleared);
        assert_eq!(engine.placement(0), Some(&Container::Category("food".to_string())));
        assert!(matches!(engine.undo(), UndoOutcome::MoveReverted(SortMove { word: 0, .. })));
        assert_eq!(engine.placement(0), Some(&Container::Pool));
        assert_eq!(engine.undo(), UndoOutcome::Nothing);
    }

    #[test]
    fn moving_after_check_returns_to_arranging() {
        let mut engine = engine(4, 5);
        engine.check_answers();
        assert!(engine.move_word(1, Container::Pool, Container::Category("food".to_string())));
        assert_eq!(engine.state(), SortingState::Arranging);
        assert_eq!(engine.verdict(1), None);
    }

    #[test]
    fn invalid_moves_are_ignored() {
        let mut engine = engine(4, 5);
        let food = Container::Category("food".to_string());
        assert!(!engine.move_word(0, food.clone(), Container::Pool));
        assert!(!engine.move_word(0, Container::Pool, Container::Pool));
        assert!(!engine.move_word(0, Container::Pool, Container::Category("verbs".to_string())));
        assert!(!engine.move_word(99, Container::Pool, food));
        assert!(engine.moves().is_empty());
    }

    #[test]
    fn all_correct_completes() {
        let mut engine = engine(4, 11);
        place_all_correctly(&mut engine);
        let check = engine.check_answers().unwrap();
        assert!(check.all_correct);
        assert!(engine.is_complete());
        assert_eq!(engine.undo(), UndoOutcome::Nothing);
        assert!(engine
            .take_events()
            .iter()
            .any(|event| matches!(event, EngineEvent::ModuleComplete(_))));
    }

    #[test]
    fn touch_drop_converges_on_move() {
        let mut engine = engine(4, 1);
        let zones = vec![
            DropZone {
                container: Container::Pool,
                bounds: Rect::new(0.0, 0.0, 300.0, 100.0),
            },
            DropZone {
                container: Container::Category("animals".to_string()),
                bounds: Rect::new(0.0, 120.0, 140.0, 200.0),
            },
            DropZone {
                container: Container::Category("food".to_string()),
                bounds: Rect::new(160.0, 120.0, 140.0, 200.0),
            },
        ];

        let mut drag = TouchDrag::press(2, Container::Pool, Point::new(10.0, 10.0));
        drag.move_to(Point::new(200.0, 150.0));
        assert!(engine.drop_word(drag, &zones));
        assert_eq!(engine.placement(2), Some(&Container::Category("food".to_string())));

        // Released back over its own container.
        let drag = TouchDrag::press(3, Container::Pool, Point::new(10.0, 10.0));
        assert!(!engine.drop_word(drag, &zones));

        // Released outside every zone.
        let mut drag = TouchDrag::press(3, Container::Pool, Point::new(10.0, 10.0));
        drag.move_to(Point::new(500.0, 500.0));
        assert!(!engine.drop_word(drag, &zones));
        assert_eq!(engine.moves().len(), 1);
    }
}
