//! Shared setup for host integration tests: a temporary content
//! directory and an in-memory database.

use drills_desktop::db::SqliteRepository;
use drills_desktop::state::AppState;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub struct TestContext {
    pub content: TempDir,
    pub state: AppState,
}

impl TestContext {
    /// # Panics
    /// Panics if the temporary catalog cannot be written or opened.
    pub fn new() -> Self {
        let content = TempDir::new().expect("temp dir");
        write_catalog(content.path());
        let repository = SqliteRepository::open_in_memory().expect("in-memory database");
        let state = AppState::new(repository, content.path().to_path_buf()).expect("catalog opens");
        Self { content, state }
    }
}

fn write(path: &Path, value: serde_json::Value) {
    fs::write(path, value.to_string()).expect("write fixture");
}

/// English catalog at the root, French under `fr/`.
pub fn write_catalog(root: &Path) {
    write(
        &root.join("modules.json"),
        json!([
            { "id": "greetings", "exerciseKind": "quiz", "level": "a1", "category": "basics" },
            { "id": "animals", "exerciseKind": "flashcards", "level": ["a1", "a2"], "category": "nouns" },
            { "id": "verbs", "exerciseKind": "completion", "level": "b1", "category": "grammar" },
            { "id": "missing", "exerciseKind": "matching", "level": "a1", "category": "basics" },
            { "id": "broken entry" }
        ]),
    );
    write(
        &root.join("greetings.json"),
        json!([
            { "question": "Hello?", "options": ["Bonjour", "Merci"], "correct": "Bonjour" },
            { "question": "Thanks?", "options": ["Salut", "Merci"], "correct": "Merci" }
        ]),
    );
    write(
        &root.join("animals.json"),
        json!({
            "data": [
                { "front": "chat", "back": "cat" },
                { "front": "chien", "back": "dog" }
            ]
        }),
    );
    write(
        &root.join("verbs.json"),
        json!([{ "sentence": "Je ___ ici.", "answer": "suis" }]),
    );

    let fr = root.join("fr");
    fs::create_dir_all(&fr).expect("create fr dir");
    write(
        &fr.join("modules.json"),
        json!([{ "id": "salutations", "exerciseKind": "quiz", "level": "a1", "category": "basics" }]),
    );
    write(
        &fr.join("salutations.json"),
        json!([{ "question": "Hello?", "options": ["Hi", "Bye"], "correct": "Hi" }]),
    );
}
