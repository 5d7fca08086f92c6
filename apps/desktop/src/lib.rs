//! Local host for the language drills core.
//!
//! Reads module content from a directory of JSON files, persists settings
//! and scores in SQLite, and exposes command functions for the UI shell.

pub mod catalog;
pub mod commands;
pub mod db;
pub mod notifier;
pub mod state;

use anyhow::Context;
use db::SqliteRepository;
use state::AppState;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DATA_DIR_ENV: &str = "DRILLS_DATA_DIR";
pub const CONTENT_DIR_ENV: &str = "DRILLS_CONTENT_DIR";

/// Install the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    // A second init (tests, embedding shells) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("language-drills")
        })
}

pub fn content_dir() -> PathBuf {
    std::env::var_os(CONTENT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("content"))
}

fn db_path() -> PathBuf {
    data_dir().join("drills.db")
}

/// Bootstrap: load `.env`, set up logging, open the database and catalog.
pub fn open_default() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();
    init_tracing();

    let db_path = db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }

    tracing::info!(path = %db_path.display(), "opening database");
    let repository = SqliteRepository::open(&db_path).context("opening database")?;
    let content = content_dir();
    let state = AppState::new(repository, content.clone())
        .with_context(|| format!("loading catalog from {}", content.display()))?;
    Ok(state)
}
