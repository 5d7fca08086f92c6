//! One learner run of a module.
//!
//! A session owns its engine exclusively. Commands are applied
//! synchronously and the engine's queued events are forwarded to the score
//! ledger and the notifier before `apply` returns.

use crate::engine::completion::CompletionOptions;
use crate::engine::matching::{ClickOutcome, Side};
use crate::engine::quiz::{QuizKey, QuizOptions};
use crate::engine::sorting::{Container, DropZone, SortingOptions, TouchDrag, UndoOutcome, WordId};
use crate::engine::{
    CompletionEngine, CompletionSummary, EngineEvent, EngineWarning, ExerciseEngine,
    FlashcardEngine, MatchingEngine, QuizEngine, SortingEngine,
};
use crate::error::{DrillError, Result};
use crate::filter::filter_content;
use crate::notify::{NoticeKind, NoticeOptions, Notifier};
use crate::score::{ModuleRecord, ScoreLedger, SessionResult};
use crate::settings::Settings;
use crate::shuffle::SessionRng;
use crate::store::KeyValueStore;
use crate::types::{ExerciseKind, ModuleContent, ModuleItems, ModuleMeta};
use chrono::Utc;

pub const ANSWER_CORRECT: &str = "answer.correct";
pub const ANSWER_INCORRECT: &str = "answer.incorrect";
pub const MODULE_COMPLETE: &str = "module.complete";
pub const UNPLACED_WORDS: &str = "sorting.unplaced";

/// The engine behind a session, tagged by exercise kind.
#[derive(Debug, Clone)]
pub enum Exercise {
    Flashcard(FlashcardEngine),
    Quiz(QuizEngine),
    Completion(CompletionEngine),
    Sorting(SortingEngine),
    Matching(MatchingEngine),
}

impl Exercise {
    pub fn engine(&self) -> &dyn ExerciseEngine {
        match self {
            Self::Flashcard(engine) => engine,
            Self::Quiz(engine) => engine,
            Self::Completion(engine) => engine,
            Self::Sorting(engine) => engine,
            Self::Matching(engine) => engine,
        }
    }

    fn engine_mut(&mut self) -> &mut dyn ExerciseEngine {
        match self {
            Self::Flashcard(engine) => engine,
            Self::Quiz(engine) => engine,
            Self::Completion(engine) => engine,
            Self::Sorting(engine) => engine,
            Self::Matching(engine) => engine,
        }
    }
}

/// Learner input, routed to whichever engine is running.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Flip,
    Next,
    Prev,
    Undo,
    SelectOption(usize),
    Key(QuizKey),
    SubmitText(String),
    MoveWord {
        word: WordId,
        from: Container,
        to: Container,
    },
    DropWord {
        drag: TouchDrag,
        zones: Vec<DropZone>,
    },
    CheckAnswers,
    Select {
        side: Side,
        id: String,
    },
    ClearFlash(u64),
}

/// Error-flash timer the host should schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTimer {
    pub token: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    /// False when the command did not apply to the engine's current state.
    pub handled: bool,
    /// Module record after this command completed the module.
    pub completed: Option<ModuleRecord>,
    pub flash: Option<FlashTimer>,
}

/// Services a session forwards engine events to.
pub struct SessionContext<'a> {
    pub ledger: &'a mut ScoreLedger,
    pub notifier: &'a mut dyn Notifier,
    pub store: &'a mut dyn KeyValueStore,
}

#[derive(Debug, Clone)]
pub struct Session {
    module: ModuleMeta,
    tip: Option<String>,
    explanation: Option<String>,
    exercise: Exercise,
    summary: Option<CompletionSummary>,
}

impl Session {
    /// Filter the module against a settings snapshot and build its engine.
    pub fn start(
        content: ModuleContent,
        settings: &Settings,
        rng: &mut SessionRng,
        ctx: &mut SessionContext<'_>,
    ) -> Result<Self> {
        let kind = content.meta.exercise_kind;
        if content.items.kind() != kind {
            return Err(DrillError::KindMismatch {
                expected: kind,
                found: content.items.kind(),
            });
        }

        let content = filter_content(content, settings, rng);
        if content.items.is_empty() {
            tracing::warn!(module = %content.meta.id, %kind, "no exercises left after filtering");
            return Err(DrillError::NoExercises { kind });
        }

        let exercise = match content.items {
            ModuleItems::Flashcard(items) => Exercise::Flashcard(FlashcardEngine::new(items)?),
            ModuleItems::Quiz(items) => Exercise::Quiz(QuizEngine::new(
                items,
                QuizOptions {
                    shuffle_options: settings.random_mode,
                },
                rng,
            )?),
            ModuleItems::Completion(items) => Exercise::Completion(CompletionEngine::new(
                items,
                CompletionOptions {
                    matching_mode: settings.completion_matching,
                    fuzzy_threshold: settings.fuzzy_threshold,
                },
            )?),
            ModuleItems::Sorting(categories) => Exercise::Sorting(SortingEngine::new(
                categories,
                SortingOptions {
                    category_count: settings.sorting_categories as usize,
                    word_count: settings.item_limit(ExerciseKind::Sorting),
                },
                rng,
            )?),
            ModuleItems::Matching(pairs) => Exercise::Matching(MatchingEngine::new(pairs, rng)?),
        };

        ctx.ledger.begin_session();
        let hint = format!("hint.{kind}");
        ctx.notifier.notify_once(
            &hint,
            NoticeKind::Info,
            &hint,
            content.tip.as_deref(),
            NoticeOptions::default(),
        );
        tracing::info!(module = %content.meta.id, %kind, "session started");

        Ok(Self {
            module: content.meta,
            tip: content.tip,
            explanation: content.explanation,
            exercise,
            summary: None,
        })
    }

    pub fn module(&self) -> &ModuleMeta {
        &self.module
    }

    pub fn kind(&self) -> ExerciseKind {
        self.module.exercise_kind
    }

    pub fn tip(&self) -> Option<&str> {
        self.tip.as_deref()
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn is_complete(&self) -> bool {
        self.exercise.engine().is_complete()
    }

    /// Completion payload, once the module is done.
    pub fn summary(&self) -> Option<&CompletionSummary> {
        self.summary.as_ref()
    }

    /// Apply one command and forward whatever the engine queued.
    pub fn apply(&mut self, command: Command, ctx: &mut SessionContext<'_>) -> Result<CommandOutcome> {
        let handled = self.dispatch(command);
        let events = self.exercise.engine_mut().take_events();
        let mut outcome = CommandOutcome {
            handled,
            ..CommandOutcome::default()
        };
        for event in events {
            self.forward(event, ctx, &mut outcome)?;
        }
        Ok(outcome)
    }

    /// Leave before completion; the running score is dropped.
    pub fn abandon(self, ledger: &mut ScoreLedger) {
        if !self.is_complete() {
            tracing::debug!(module = %self.module.id, "session abandoned");
            ledger.discard_pending();
        }
    }

    fn dispatch(&mut self, command: Command) -> bool {
        match (&mut self.exercise, command) {
            (Exercise::Flashcard(engine), Command::Flip) => engine.flip(),
            (Exercise::Flashcard(engine), Command::Next) => engine.next(),
            (Exercise::Flashcard(engine), Command::Prev) => engine.prev(),

            (Exercise::Quiz(engine), Command::SelectOption(option)) => {
                engine.submit_answer(option).is_some()
            }
            (Exercise::Quiz(engine), Command::Key(key)) => engine.handle_key(key),
            (Exercise::Quiz(engine), Command::Next) => engine.next(),
            (Exercise::Quiz(engine), Command::Prev) => engine.prev(),
            (Exercise::Quiz(engine), Command::Undo) => engine.undo(),

            (Exercise::Completion(engine), Command::SubmitText(text)) => {
                engine.submit_answer(&text).is_some()
            }
            (Exercise::Completion(engine), Command::Next) => engine.next(),
            (Exercise::Completion(engine), Command::Prev) => engine.prev(),
            (Exercise::Completion(engine), Command::Undo) => engine.undo(),

            (Exercise::Sorting(engine), Command::MoveWord { word, from, to }) => {
                engine.move_word(word, from, to)
            }
            (Exercise::Sorting(engine), Command::DropWord { drag, zones }) => {
                engine.drop_word(drag, &zones)
            }
            (Exercise::Sorting(engine), Command::CheckAnswers) => engine.check_answers().is_some(),
            (Exercise::Sorting(engine), Command::Undo) => {
                engine.undo() != UndoOutcome::Nothing
            }

            (Exercise::Matching(engine), Command::Select { side, id }) => {
                engine.click(side, &id) != ClickOutcome::Ignored
            }
            (Exercise::Matching(engine), Command::ClearFlash(token)) => engine.clear_flash(token),
            (Exercise::Matching(engine), Command::Undo) => engine.undo(),

            (exercise, command) => {
                tracing::debug!(kind = %exercise.engine().kind(), ?command, "command does not apply");
                false
            }
        }
    }

    fn forward(
        &mut self,
        event: EngineEvent,
        ctx: &mut SessionContext<'_>,
        outcome: &mut CommandOutcome,
    ) -> Result<()> {
        match event {
            EngineEvent::Scored(delta) => ctx.ledger.record(delta),
            EngineEvent::ScoreReplaced(score) => ctx.ledger.replace_pending(score),
            EngineEvent::Answered { correct: true, .. } => ctx.notifier.notify_single(
                NoticeKind::Success,
                ANSWER_CORRECT,
                None,
                NoticeOptions::default(),
            ),
            EngineEvent::Answered {
                correct: false,
                expected,
            } => ctx.notifier.notify_single(
                NoticeKind::Error,
                ANSWER_INCORRECT,
                expected.as_deref(),
                NoticeOptions::default(),
            ),
            EngineEvent::ErrorFlash { token, duration_ms } => {
                outcome.flash = Some(FlashTimer { token, duration_ms });
            }
            EngineEvent::Warning(EngineWarning::UnplacedWords(count)) => ctx.notifier.notify(
                NoticeKind::Warning,
                UNPLACED_WORDS,
                Some(&count.to_string()),
                NoticeOptions::default(),
            ),
            EngineEvent::ModuleComplete(summary) => {
                let result = SessionResult {
                    score: summary.score,
                    cards_studied: summary.cards_studied,
                };
                let record = ctx.ledger.commit(&*ctx.store, &self.module.id, result, Utc::now());
                ctx.ledger.save(&mut *ctx.store)?;
                ctx.notifier.notify(
                    NoticeKind::Success,
                    MODULE_COMPLETE,
                    self.module.title.as_deref(),
                    NoticeOptions::default(),
                );
                outcome.completed = Some(record);
                self.summary = Some(summary);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastQueue;
    use crate::store::MemoryStore;
    use crate::types::{ModuleLevels, QuizItem};

    fn quiz_module() -> ModuleContent {
        ModuleContent {
            meta: ModuleMeta {
                id: "quiz-basics".to_string(),
                exercise_kind: ExerciseKind::Quiz,
                level: ModuleLevels::One("a1".to_string()),
                category: "grammar".to_string(),
                title: None,
            },
            items: ModuleItems::Quiz(vec![QuizItem {
                prompt_text: "?".to_string(),
                correct_option: "A".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                explanation: None,
                level: None,
                category: None,
            }]),
            tip: Some("take your time".to_string()),
            explanation: None,
        }
    }

    fn ordered_settings() -> Settings {
        Settings {
            random_mode: false,
            ..Settings::default()
        }
    }

    #[test]
    fn hint_fires_once_per_kind() {
        let mut ledger = ScoreLedger::new();
        let mut toasts = ToastQueue::new();
        let mut store = MemoryStore::new();
        let mut rng = SessionRng::seeded(1);
        let settings = ordered_settings();
        for _ in 0..2 {
            let mut ctx = SessionContext {
                ledger: &mut ledger,
                notifier: &mut toasts,
                store: &mut store,
            };
            Session::start(quiz_module(), &settings, &mut rng, &mut ctx).unwrap();
        }
        assert_eq!(toasts.visible().len(), 1);
        assert_eq!(toasts.visible()[0].title, "hint.quiz");
    }

    #[test]
    fn foreign_commands_are_unhandled() {
        let mut ledger = ScoreLedger::new();
        let mut toasts = ToastQueue::new();
        let mut store = MemoryStore::new();
        let mut ctx = SessionContext {
            ledger: &mut ledger,
            notifier: &mut toasts,
            store: &mut store,
        };
        let mut session = Session::start(
            quiz_module(),
            &ordered_settings(),
            &mut SessionRng::seeded(1),
            &mut ctx,
        )
        .unwrap();
        let outcome = session.apply(Command::Flip, &mut ctx).unwrap();
        assert!(!outcome.handled);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut content = quiz_module();
        content.meta.exercise_kind = ExerciseKind::Matching;
        let mut ledger = ScoreLedger::new();
        let mut toasts = ToastQueue::new();
        let mut store = MemoryStore::new();
        let mut ctx = SessionContext {
            ledger: &mut ledger,
            notifier: &mut toasts,
            store: &mut store,
        };
        let err = Session::start(content, &ordered_settings(), &mut SessionRng::seeded(1), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, DrillError::KindMismatch { .. }));
    }
}
