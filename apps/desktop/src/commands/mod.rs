//! Commands exposed to the presentation layer.

pub mod modules;
pub mod scores;
pub mod session;
pub mod settings;

pub use modules::{list_modules, ModuleSummary};
pub use scores::{get_global_score, get_module_record, recent_sessions};
pub use session::{
    apply_command, current_session, dismiss_toast, return_to_menu, start_module, CommandResponse,
    SessionStatus,
};
pub use settings::{get_settings, save_settings, update_settings};

use crate::catalog::CatalogError;
use crate::db::DbError;
use drill_core::DrillError;
use std::sync::PoisonError;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<DbError> for CommandError {
    fn from(e: DbError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CatalogError> for CommandError {
    fn from(e: CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<DrillError> for CommandError {
    fn from(e: DrillError) -> Self {
        Self::new(e.to_string())
    }
}

impl<T> From<PoisonError<T>> for CommandError {
    fn from(_: PoisonError<T>) -> Self {
        Self::new("application state lock poisoned")
    }
}
