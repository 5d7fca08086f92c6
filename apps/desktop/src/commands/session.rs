//! Session commands: start a module, feed it input, leave it.

use super::CommandError;
use crate::db::{ActivityRepository, SessionLogEntry};
use crate::state::AppState;
use chrono::Utc;
use drill_core::{
    Command, ExerciseEngine, ExerciseKind, ModuleRecord, SessionRng, SessionScore, Toast,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub module_id: String,
    pub kind: ExerciseKind,
    pub score: SessionScore,
    pub complete: bool,
    pub tip: Option<String>,
    pub toasts: Vec<Toast>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub handled: bool,
    pub completed: Option<ModuleRecord>,
    /// Token to pass back via `Command::ClearFlash` after `flash_ms`.
    pub flash_token: Option<u64>,
    pub flash_ms: Option<u64>,
    pub status: SessionStatus,
}

fn no_session() -> CommandError {
    CommandError::new("no active session")
}

fn status(rt: &crate::state::Runtime) -> Option<SessionStatus> {
    let session = rt.session.as_ref()?;
    let engine = session.exercise().engine();
    Some(SessionStatus {
        module_id: session.module().id.clone(),
        kind: session.kind(),
        score: engine.score(),
        complete: engine.is_complete(),
        tip: session.tip().map(str::to_string),
        toasts: rt.notifier.visible().to_vec(),
    })
}

/// Load a module, filter it against a settings snapshot and start it.
///
/// A session still in progress is abandoned first.
pub fn start_module(state: &AppState, module_id: &str) -> Result<SessionStatus, CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;

    if let Some(previous) = rt.session.take() {
        previous.abandon(&mut rt.ledger);
    }

    let content = rt.catalog()?.load(module_id)?;
    let settings = rt.settings.snapshot();
    let mut rng = SessionRng::new(settings.seed);
    let (_, mut ctx) = rt.session_parts();
    let session = drill_core::Session::start(content, &settings, &mut rng, &mut ctx)?;
    rt.session = Some(session);

    status(rt).ok_or_else(no_session)
}

/// Route one learner input to the active session.
pub fn apply_command(state: &AppState, command: Command) -> Result<CommandResponse, CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;

    let (outcome, log_entry) = {
        let (session, mut ctx) = rt.session_parts();
        let session = session.ok_or_else(no_session)?;
        let outcome = session.apply(command, &mut ctx)?;
        let log_entry = match (&outcome.completed, session.summary()) {
            (Some(_), Some(summary)) => Some(SessionLogEntry {
                module_id: session.module().id.clone(),
                exercise_kind: summary.kind,
                correct: summary.score.correct,
                incorrect: summary.score.incorrect,
                cards_studied: summary.cards_studied,
                completed_at: Utc::now(),
            }),
            _ => None,
        };
        (outcome, log_entry)
    };

    if let Some(entry) = log_entry {
        rt.repository.record_session(&entry)?;
    }

    Ok(CommandResponse {
        handled: outcome.handled,
        completed: outcome.completed,
        flash_token: outcome.flash.map(|flash| flash.token),
        flash_ms: outcome.flash.map(|flash| flash.duration_ms),
        status: status(rt).ok_or_else(no_session)?,
    })
}

pub fn current_session(state: &AppState) -> Result<Option<SessionStatus>, CommandError> {
    let rt = state.runtime.lock()?;
    Ok(status(&rt))
}

/// Discard the active session; an unfinished run's score is dropped.
pub fn return_to_menu(state: &AppState) -> Result<(), CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;
    if let Some(session) = rt.session.take() {
        session.abandon(&mut rt.ledger);
    }
    rt.notifier.clear();
    Ok(())
}

/// Toast timer callback; stale ids are ignored.
pub fn dismiss_toast(state: &AppState, toast_id: u64) -> Result<bool, CommandError> {
    let mut rt = state.runtime.lock()?;
    Ok(rt.notifier.dismiss(toast_id))
}
