//! Content model shared by the filter, the engines and the host.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Exercise kind of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    #[serde(alias = "flashcards")]
    Flashcard,
    Quiz,
    Completion,
    Sorting,
    Matching,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 5] = [
        Self::Flashcard,
        Self::Quiz,
        Self::Completion,
        Self::Sorting,
        Self::Matching,
    ];

    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flashcard => "flashcard",
            Self::Quiz => "quiz",
            Self::Completion => "completion",
            Self::Sorting => "sorting",
            Self::Matching => "matching",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "flashcard" | "flashcards" => Some(Self::Flashcard),
            "quiz" => Some(Self::Quiz),
            "completion" => Some(Self::Completion),
            "sorting" => Some(Self::Sorting),
            "matching" => Some(Self::Matching),
            _ => None,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module level: either a single level or a list of levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleLevels {
    One(String),
    Many(Vec<String>),
}

impl ModuleLevels {
    pub fn levels(&self) -> Vec<&str> {
        match self {
            Self::One(level) => vec![level.as_str()],
            Self::Many(levels) => levels.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for ModuleLevels {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Module metadata from the catalog's module list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMeta {
    pub id: String,
    #[serde(alias = "type", alias = "kind")]
    pub exercise_kind: ExerciseKind,
    #[serde(default)]
    pub level: ModuleLevels,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardItem {
    #[serde(alias = "word")]
    pub front: String,
    #[serde(alias = "translation")]
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    #[serde(alias = "question")]
    pub prompt_text: String,
    #[serde(alias = "correct", alias = "answer")]
    pub correct_option: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Blank marker a completion prompt must contain exactly once.
pub const BLANK_MARKER: &str = "___";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    #[serde(alias = "sentence")]
    pub prompt_template: String,
    #[serde(alias = "answer")]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CompletionItem {
    /// Split the template around its blank: text before and after.
    ///
    /// Any run of underscores longer than the marker is treated as one blank.
    pub fn split_prompt(&self) -> Option<(&str, &str)> {
        let start = self.prompt_template.find(BLANK_MARKER)?;
        let rest = &self.prompt_template[start..];
        let width = rest.len() - rest.trim_start_matches('_').len();
        Some((
            &self.prompt_template[..start],
            &self.prompt_template[start + width..],
        ))
    }
}

/// Word entry inside a sorting category: a bare string or an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortingEntry {
    Word(String),
    Detailed {
        word: String,
        #[serde(default)]
        level: Option<String>,
    },
}

/// Sorting category as stored in module data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortingCategoryData {
    #[serde(alias = "id")]
    pub category_id: String,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(alias = "words")]
    pub items: Vec<SortingEntry>,
}

/// One word to sort, tagged with its true category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingWord {
    pub word: String,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Sorting category grouped with its words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingCategory {
    pub category_id: String,
    pub display_name: String,
    pub items: Vec<SortingWord>,
}

impl From<SortingCategoryData> for SortingCategory {
    fn from(data: SortingCategoryData) -> Self {
        let category_id = data.category_id;
        let items = data
            .items
            .into_iter()
            .map(|entry| match entry {
                SortingEntry::Word(word) => SortingWord {
                    word,
                    category_id: category_id.clone(),
                    level: None,
                },
                SortingEntry::Detailed { word, level } => SortingWord {
                    word,
                    category_id: category_id.clone(),
                    level,
                },
            })
            .collect();
        let display_name = if data.display_name.is_empty() {
            category_id.clone()
        } else {
            data.display_name
        };
        Self {
            category_id,
            display_name,
            items,
        }
    }
}

/// Identifier of a matching pair; shared by its term and definition.
pub type PairId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPair {
    #[serde(deserialize_with = "string_or_number")]
    pub id: PairId,
    #[serde(alias = "term")]
    pub term_text: String,
    #[serde(alias = "definition")]
    pub definition_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Module items, tagged once by exercise kind at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItems {
    Flashcard(Vec<FlashcardItem>),
    Quiz(Vec<QuizItem>),
    Completion(Vec<CompletionItem>),
    Sorting(Vec<SortingCategory>),
    Matching(Vec<MatchingPair>),
}

impl ModuleItems {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Self::Flashcard(_) => ExerciseKind::Flashcard,
            Self::Quiz(_) => ExerciseKind::Quiz,
            Self::Completion(_) => ExerciseKind::Completion,
            Self::Sorting(_) => ExerciseKind::Sorting,
            Self::Matching(_) => ExerciseKind::Matching,
        }
    }

    /// Number of learnable units (words for sorting).
    pub fn len(&self) -> usize {
        match self {
            Self::Flashcard(items) => items.len(),
            Self::Quiz(items) => items.len(),
            Self::Completion(items) => items.len(),
            Self::Sorting(categories) => categories.iter().map(|c| c.items.len()).sum(),
            Self::Matching(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loaded module: metadata, typed items and optional companions.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleContent {
    pub meta: ModuleMeta,
    pub items: ModuleItems,
    pub tip: Option<String>,
    pub explanation: Option<String>,
}
