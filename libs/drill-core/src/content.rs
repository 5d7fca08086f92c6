//! JSON content parsing for module lists and module data.
//!
//! # Format
//! A module data resource is either a bare array of items or an object
//! carrying the array under `data`, plus optional companions:
//! ```json
//! { "data": [ { "question": "...", "options": ["a", "b"], "correct": "a" } ],
//!   "tip": "Read the whole sentence first." }
//! ```
//! Each element is parsed on its own; malformed elements are skipped and
//! logged so a single bad item never takes the whole module down.

use crate::error::{DrillError, Result};
use crate::types::{
    CompletionItem, ExerciseKind, FlashcardItem, MatchingPair, ModuleContent, ModuleItems,
    ModuleMeta, QuizItem, SortingCategory, SortingCategoryData, BLANK_MARKER,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

/// Parse the catalog's module list.
pub fn parse_module_list(content: &str) -> Result<Vec<ModuleMeta>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(entries) = value else {
        return Err(DrillError::UnexpectedPayload {
            module: "<module list>".to_string(),
        });
    };

    let mut modules = Vec::with_capacity(entries.len());
    let mut seen_ids = HashSet::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ModuleMeta>(entry) {
            Ok(meta) if !seen_ids.insert(meta.id.clone()) => {
                tracing::warn!(module = %meta.id, index, "skipping duplicate module id");
            }
            Ok(meta) => modules.push(meta),
            Err(e) => tracing::warn!(index, error = %e, "skipping malformed module entry"),
        }
    }
    Ok(modules)
}

/// Parse one module's data resource into typed items.
pub fn parse_module_data(meta: &ModuleMeta, content: &str) -> Result<ModuleContent> {
    let value: Value = serde_json::from_str(content)?;
    let (entries, tip, explanation) = split_payload(meta, value)?;

    let items = match meta.exercise_kind {
        ExerciseKind::Flashcard => {
            ModuleItems::Flashcard(collect_items(meta, entries, validate_flashcard))
        }
        ExerciseKind::Quiz => ModuleItems::Quiz(collect_items(meta, entries, validate_quiz)),
        ExerciseKind::Completion => {
            ModuleItems::Completion(collect_items(meta, entries, validate_completion))
        }
        ExerciseKind::Sorting => ModuleItems::Sorting(
            collect_items(meta, entries, validate_sorting)
                .into_iter()
                .map(SortingCategory::from)
                .collect(),
        ),
        ExerciseKind::Matching => {
            let mut seen_ids = HashSet::new();
            ModuleItems::Matching(collect_items(meta, entries, |pair: &MatchingPair| {
                validate_matching(pair)?;
                if seen_ids.insert(pair.id.clone()) {
                    Ok(())
                } else {
                    Err(format!("duplicate pair id {}", pair.id))
                }
            }))
        }
    };

    tracing::debug!(module = %meta.id, kind = %meta.exercise_kind, count = items.len(), "parsed module data");

    Ok(ModuleContent {
        meta: meta.clone(),
        items,
        tip,
        explanation,
    })
}

fn split_payload(
    meta: &ModuleMeta,
    value: Value,
) -> Result<(Vec<Value>, Option<String>, Option<String>)> {
    match value {
        Value::Array(entries) => Ok((entries, None, None)),
        Value::Object(mut map) => {
            let Some(Value::Array(entries)) = map.remove("data") else {
                return Err(DrillError::UnexpectedPayload {
                    module: meta.id.clone(),
                });
            };
            let text = |v: Option<Value>| match v {
                Some(Value::String(s)) => Some(s),
                _ => None,
            };
            Ok((entries, text(map.remove("tip")), text(map.remove("explanation"))))
        }
        _ => Err(DrillError::UnexpectedPayload {
            module: meta.id.clone(),
        }),
    }
}

fn collect_items<T, F>(meta: &ModuleMeta, entries: Vec<Value>, mut validate: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: FnMut(&T) -> std::result::Result<(), String>,
{
    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let parsed = serde_json::from_value::<T>(entry)
            .map_err(|e| e.to_string())
            .and_then(|item| validate(&item).map(|()| item));
        match parsed {
            Ok(item) => items.push(item),
            Err(reason) => {
                tracing::warn!(module = %meta.id, index, %reason, "skipping malformed item")
            }
        }
    }
    items
}

fn require(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("empty {field}"))
    } else {
        Ok(())
    }
}

fn validate_flashcard(item: &FlashcardItem) -> std::result::Result<(), String> {
    require("front", &item.front)?;
    require("back", &item.back)
}

fn validate_quiz(item: &QuizItem) -> std::result::Result<(), String> {
    require("prompt", &item.prompt_text)?;
    require("correct option", &item.correct_option)?;
    if item.options.len() < 2 {
        return Err("fewer than two options".to_string());
    }
    if !item.options.contains(&item.correct_option) {
        return Err("correct option not among options".to_string());
    }
    Ok(())
}

fn validate_completion(item: &CompletionItem) -> std::result::Result<(), String> {
    require("correct answer", &item.correct_answer)?;
    if item.prompt_template.matches(BLANK_MARKER).count() == 0 {
        return Err("prompt has no blank".to_string());
    }
    Ok(())
}

fn validate_sorting(category: &SortingCategoryData) -> std::result::Result<(), String> {
    require("category id", &category.category_id)?;
    if category.items.is_empty() {
        return Err("category has no words".to_string());
    }
    Ok(())
}

fn validate_matching(pair: &MatchingPair) -> std::result::Result<(), String> {
    require("pair id", &pair.id)?;
    require("term", &pair.term_text)?;
    require("definition", &pair.definition_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModuleLevels;

    fn meta(kind: ExerciseKind) -> ModuleMeta {
        ModuleMeta {
            id: "m1".to_string(),
            exercise_kind: kind,
            level: ModuleLevels::One("A1".to_string()),
            category: "food".to_string(),
            title: None,
        }
    }

    #[test]
    fn parse_module_list_skips_bad_entries() {
        let input = r#"[
            {"id": "greetings", "exerciseKind": "flashcard", "level": "A1", "category": "basics"},
            {"id": "colors", "type": "quiz", "level": ["A1", "A2"], "category": "basics"},
            {"id": "broken"},
            {"id": "greetings", "exerciseKind": "quiz"}
        ]"#;
        let modules = parse_module_list(input).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1].exercise_kind, ExerciseKind::Quiz);
        assert_eq!(modules[1].level.levels(), vec!["A1", "A2"]);
    }

    #[test]
    fn parse_bare_array() {
        let input = r#"[{"front": "chat", "back": "cat"}]"#;
        let content = parse_module_data(&meta(ExerciseKind::Flashcard), input).unwrap();
        assert_eq!(content.items.len(), 1);
        assert!(content.tip.is_none());
    }

    #[test]
    fn parse_data_object_with_companions() {
        let input = r#"{"data": [{"sentence": "Je ___ ici.", "answer": "suis"}], "tip": "être"}"#;
        let content = parse_module_data(&meta(ExerciseKind::Completion), input).unwrap();
        assert_eq!(content.tip.as_deref(), Some("être"));
        assert!(matches!(content.items, ModuleItems::Completion(ref items) if items.len() == 1));
    }

    #[test]
    fn skip_quiz_without_correct_option() {
        let input = r#"[
            {"question": "Q1", "options": ["a", "b"], "correct": "a"},
            {"question": "Q2", "options": ["a", "b"]},
            {"question": "Q3", "options": ["a", "b"], "correct": "c"}
        ]"#;
        let content = parse_module_data(&meta(ExerciseKind::Quiz), input).unwrap();
        assert_eq!(content.items.len(), 1);
    }

    #[test]
    fn skip_duplicate_matching_ids() {
        let input = r#"[
            {"id": 1, "term": "chien", "definition": "dog"},
            {"id": "1", "term": "chat", "definition": "cat"},
            {"id": 2, "term": "oiseau", "definition": "bird"}
        ]"#;
        let content = parse_module_data(&meta(ExerciseKind::Matching), input).unwrap();
        assert_eq!(content.items.len(), 2);
    }

    #[test]
    fn sorting_words_carry_category() {
        let input = r#"[
            {"categoryId": "fruit", "displayName": "Fruit", "items": ["pomme", {"word": "poire"}]},
            {"id": "veg", "words": ["carotte"]}
        ]"#;
        let content = parse_module_data(&meta(ExerciseKind::Sorting), input).unwrap();
        let ModuleItems::Sorting(categories) = content.items else {
            panic!("expected sorting items");
        };
        assert_eq!(categories[0].items[1].category_id, "fruit");
        assert_eq!(categories[1].display_name, "veg");
    }

    #[test]
    fn reject_unexpected_payload() {
        let result = parse_module_data(&meta(ExerciseKind::Quiz), r#"{"items": []}"#);
        assert!(matches!(result, Err(DrillError::UnexpectedPayload { .. })));

        let result = parse_module_data(&meta(ExerciseKind::Quiz), "42");
        assert!(matches!(result, Err(DrillError::UnexpectedPayload { .. })));
    }

    #[test]
    fn reject_invalid_json() {
        let result = parse_module_data(&meta(ExerciseKind::Quiz), "[");
        assert!(matches!(result, Err(DrillError::InvalidJson(_))));
    }
}
