//! Shared harness for session-level integration tests.
//!
//! Wires a session to an in-memory store, a toast queue and a score ledger
//! the same way the desktop host does, with a fixed seed.

pub mod fixtures;

use drill_core::{
    Command, CommandOutcome, GlobalScore, MemoryStore, ModuleContent, ScoreLedger, Session,
    SessionContext, SessionRng, Settings, ToastQueue,
};

pub const SEED: u64 = 42;

pub struct TestContext {
    pub ledger: ScoreLedger,
    pub toasts: ToastQueue,
    pub store: MemoryStore,
    pub settings: Settings,
    pub rng: SessionRng,
}

impl TestContext {
    /// Ordered (non-random) settings so item order follows the fixture.
    pub fn new() -> Self {
        Self::with_settings(Settings {
            random_mode: false,
            ..Settings::default()
        })
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            ledger: ScoreLedger::new(),
            toasts: ToastQueue::new(),
            store: MemoryStore::new(),
            settings: settings.validated(),
            rng: SessionRng::seeded(SEED),
        }
    }

    pub fn try_start(&mut self, content: ModuleContent) -> drill_core::Result<Session> {
        let mut ctx = SessionContext {
            ledger: &mut self.ledger,
            notifier: &mut self.toasts,
            store: &mut self.store,
        };
        Session::start(content, &self.settings, &mut self.rng, &mut ctx)
    }

    /// # Panics
    /// Panics if the module cannot be started.
    pub fn start(&mut self, content: ModuleContent) -> Session {
        self.try_start(content).expect("session should start")
    }

    pub fn apply(&mut self, session: &mut Session, command: Command) -> CommandOutcome {
        let mut ctx = SessionContext {
            ledger: &mut self.ledger,
            notifier: &mut self.toasts,
            store: &mut self.store,
        };
        session.apply(command, &mut ctx).expect("command should apply")
    }

    pub fn global(&self) -> GlobalScore {
        self.ledger.global()
    }

    pub fn last_toast_title(&self) -> Option<&str> {
        self.toasts.visible().last().map(|toast| toast.title.as_str())
    }
}
