//! Score commands.

use super::CommandError;
use crate::db::{ActivityRepository, SessionLogEntry};
use crate::state::AppState;
use drill_core::{GlobalScore, ModuleRecord};

pub fn get_global_score(state: &AppState) -> Result<GlobalScore, CommandError> {
    let rt = state.runtime.lock()?;
    Ok(rt.ledger.global())
}

pub fn get_module_record(state: &AppState, module_id: &str) -> Result<ModuleRecord, CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;
    Ok(rt.ledger.module_record(&rt.repository, module_id))
}

/// Most recent completed sessions, newest first (default 20).
pub fn recent_sessions(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<SessionLogEntry>, CommandError> {
    let rt = state.runtime.lock()?;
    rt.repository
        .recent_sessions(limit.unwrap_or(20))
        .map_err(Into::into)
}
