//! Module menu commands.

use super::CommandError;
use crate::state::AppState;
use drill_core::{filter_modules, ModuleMeta, SessionScore};
use serde::Serialize;

/// Menu entry: module metadata plus the learner's record on it.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    #[serde(flatten)]
    pub meta: ModuleMeta,
    pub attempts: u32,
    pub best: Option<SessionScore>,
}

/// List modules visible under the current level/category filters.
pub fn list_modules(state: &AppState) -> Result<Vec<ModuleSummary>, CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;
    let settings = rt.settings.snapshot();
    let visible: Vec<ModuleMeta> = filter_modules(rt.catalog()?.modules(), &settings)
        .into_iter()
        .cloned()
        .collect();

    Ok(visible
        .into_iter()
        .map(|meta| {
            let record = rt.ledger.module_record(&rt.repository, &meta.id);
            ModuleSummary {
                attempts: record.attempts,
                best: (record.attempts > 0).then_some(record.best),
                meta,
            }
        })
        .collect())
}
