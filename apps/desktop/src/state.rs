//! Application state.

use crate::catalog::{CatalogError, DirectorySource};
use crate::db::SqliteRepository;
use crate::notifier::TracingNotifier;
use drill_core::{ScoreLedger, Session, SessionContext, Settings, SettingsObserver, SettingsStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Global application state.
pub struct AppState {
    pub runtime: Mutex<Runtime>,
}

impl AppState {
    pub fn new(repository: SqliteRepository, content_root: PathBuf) -> Result<Self, CatalogError> {
        Ok(Self {
            runtime: Mutex::new(Runtime::new(repository, content_root)?),
        })
    }
}

/// Long-lived services plus the one active session, if any.
pub struct Runtime {
    pub repository: SqliteRepository,
    pub settings: SettingsStore,
    pub ledger: ScoreLedger,
    pub notifier: TracingNotifier,
    pub session: Option<Session>,
    content_root: PathBuf,
    catalog: DirectorySource,
    catalog_stale: Arc<AtomicBool>,
}

/// Marks the catalog for reload when the language changes.
struct CatalogInvalidator {
    stale: Arc<AtomicBool>,
}

impl SettingsObserver for CatalogInvalidator {
    fn settings_changed(&mut self, previous: &Settings, current: &Settings) {
        if previous.language != current.language {
            tracing::info!(from = %previous.language, to = %current.language, "language changed");
            self.stale.store(true, Ordering::SeqCst);
        }
    }
}

impl Runtime {
    pub fn new(repository: SqliteRepository, content_root: PathBuf) -> Result<Self, CatalogError> {
        let mut settings = SettingsStore::load(&repository);
        let ledger = ScoreLedger::load(&repository);
        let catalog = DirectorySource::open(&content_root, &settings.current().language)?;

        let catalog_stale = Arc::new(AtomicBool::new(false));
        settings.subscribe(Box::new(CatalogInvalidator {
            stale: Arc::clone(&catalog_stale),
        }));

        Ok(Self {
            repository,
            settings,
            ledger,
            notifier: TracingNotifier::new(),
            session: None,
            content_root,
            catalog,
            catalog_stale,
        })
    }

    /// Current catalog, re-read first if the language changed.
    pub fn catalog(&mut self) -> Result<&DirectorySource, CatalogError> {
        if self.catalog_stale.swap(false, Ordering::SeqCst) {
            let language = &self.settings.current().language;
            match DirectorySource::open(&self.content_root, language) {
                Ok(catalog) => self.catalog = catalog,
                Err(e) => {
                    self.catalog_stale.store(true, Ordering::SeqCst);
                    return Err(e);
                }
            }
        }
        Ok(&self.catalog)
    }

    /// Split borrow handing the session its services.
    pub fn session_parts(&mut self) -> (Option<&mut Session>, SessionContext<'_>) {
        (
            self.session.as_mut(),
            SessionContext {
                ledger: &mut self.ledger,
                notifier: &mut self.notifier,
                store: &mut self.repository,
            },
        )
    }
}
