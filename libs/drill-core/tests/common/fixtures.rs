//! Module payloads in the catalog's JSON format.

use drill_core::{parse_module_data, ExerciseKind, ModuleContent, ModuleMeta};
use serde_json::json;

/// Parse `data` as the payload of a module with the given kind.
pub fn module(id: &str, kind: ExerciseKind, data: serde_json::Value) -> ModuleContent {
    let meta: ModuleMeta = serde_json::from_value(json!({
        "id": id,
        "exerciseKind": kind.as_str(),
        "level": "a1",
        "category": "basics",
    }))
    .expect("valid module meta");
    parse_module_data(&meta, &data.to_string()).expect("valid module data")
}

/// Two questions: first answered by option 0, second by option 1.
pub fn two_question_quiz() -> ModuleContent {
    module(
        "quiz-letters",
        ExerciseKind::Quiz,
        json!([
            { "question": "First?", "options": ["A", "B"], "correct": "A" },
            { "question": "Second?", "options": ["C", "D"], "correct": "D" }
        ]),
    )
}

pub fn flashcards(count: usize) -> ModuleContent {
    let cards: Vec<_> = (0..count)
        .map(|i| json!({ "front": format!("mot {i}"), "back": format!("word {i}") }))
        .collect();
    module("cards", ExerciseKind::Flashcard, json!(cards))
}

pub fn capitals_completion() -> ModuleContent {
    module(
        "capitals",
        ExerciseKind::Completion,
        json!({
            "data": [
                { "sentence": "The capital of France is ___.", "answer": "paris" },
                { "sentence": "The capital of Italy is ___.", "answer": "rome" }
            ],
            "tip": "Capitals are proper nouns."
        }),
    )
}

pub fn animals_and_food() -> ModuleContent {
    module(
        "nouns",
        ExerciseKind::Sorting,
        json!([
            { "id": "animals", "name": "Animals", "words": ["chat", "chien", "loup", "ours"] },
            { "id": "food", "name": "Food", "words": ["pain", "fromage", "pomme"] },
            { "id": "colours", "name": "Colours", "words": ["rouge", "vert"] }
        ]),
    )
}

pub fn pets_matching() -> ModuleContent {
    module(
        "pets",
        ExerciseKind::Matching,
        json!([
            { "id": 1, "term": "chat", "definition": "cat" },
            { "id": 2, "term": "chien", "definition": "dog" }
        ]),
    )
}

/// Quiz whose items mix levels a1 and b2.
pub fn mixed_level_quiz() -> ModuleContent {
    module(
        "quiz-levels",
        ExerciseKind::Quiz,
        json!([
            { "question": "Easy?", "options": ["x", "y"], "correct": "x", "level": "a1" },
            { "question": "Hard?", "options": ["x", "y"], "correct": "y", "level": "b2" },
            { "question": "Also easy?", "options": ["x", "y"], "correct": "y" }
        ]),
    )
}
