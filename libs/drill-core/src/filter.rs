//! Settings-driven slicing of module content into a session's working set.

use crate::settings::{LevelFilter, Settings};
use crate::shuffle::SessionRng;
use crate::types::{
    CompletionItem, ExerciseKind, FlashcardItem, MatchingPair, ModuleContent, ModuleItems,
    ModuleMeta, QuizItem, SortingWord,
};

/// Level/category tags used by the filter.
///
/// Items without their own tags inherit the module's.
pub trait Classified {
    fn levels(&self) -> Vec<&str>;
    fn category(&self) -> Option<&str>;
}

impl Classified for ModuleMeta {
    fn levels(&self) -> Vec<&str> {
        self.level.levels()
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str()).filter(|c| !c.is_empty())
    }
}

macro_rules! classified_item {
    ($($ty:ty),*) => {
        $(impl Classified for $ty {
            fn levels(&self) -> Vec<&str> {
                self.level.as_deref().into_iter().collect()
            }

            fn category(&self) -> Option<&str> {
                self.category.as_deref()
            }
        })*
    };
}

classified_item!(FlashcardItem, QuizItem, CompletionItem, MatchingPair);

impl Classified for SortingWord {
    fn levels(&self) -> Vec<&str> {
        self.level.as_deref().into_iter().collect()
    }

    // The sorting bucket is not a content category.
    fn category(&self) -> Option<&str> {
        None
    }
}

/// Filter inputs for one exercise kind.
#[derive(Debug, Clone)]
pub struct FilterOptions<'a> {
    pub level: &'a LevelFilter,
    pub categories: &'a [String],
    pub limit: usize,
    pub shuffle: bool,
    pub apply_categories: bool,
}

impl<'a> FilterOptions<'a> {
    pub fn from_settings(settings: &'a Settings, kind: ExerciseKind) -> Self {
        Self {
            level: &settings.level,
            categories: &settings.categories,
            limit: settings.item_limit(kind),
            shuffle: settings.random_mode,
            // Sorting needs every category present to be meaningful.
            apply_categories: kind != ExerciseKind::Sorting,
        }
    }

    pub fn accepts<T: Classified>(&self, item: &T, module: &ModuleMeta) -> bool {
        let mut levels = item.levels();
        if levels.is_empty() {
            levels = module.levels();
        }
        let level_ok = matches!(self.level, LevelFilter::All)
            || levels.iter().any(|level| self.level.accepts(level));

        let category_ok = !self.apply_categories
            || self.categories.is_empty()
            || item
                .category()
                .or_else(|| module.category())
                .is_some_and(|category| self.categories.iter().any(|c| c == category));

        level_ok && category_ok
    }
}

/// Keep accepted items, shuffle when requested, then truncate to the limit.
pub fn filter_items<T: Classified>(
    module: &ModuleMeta,
    items: Vec<T>,
    options: &FilterOptions<'_>,
    rng: &mut SessionRng,
) -> Vec<T> {
    let mut kept: Vec<T> = items
        .into_iter()
        .filter(|item| options.accepts(item, module))
        .collect();
    if options.shuffle {
        rng.shuffle(&mut kept);
    }
    kept.truncate(options.limit);
    kept
}

/// Apply the filter to a loaded module.
///
/// Sorting words only obey the level filter here; the word limit is
/// enforced by the sorting engine's per-category selection.
pub fn filter_content(
    content: ModuleContent,
    settings: &Settings,
    rng: &mut SessionRng,
) -> ModuleContent {
    let kind = content.meta.exercise_kind;
    let options = FilterOptions::from_settings(settings, kind);
    let meta = &content.meta;
    let before = content.items.len();

    let items = match content.items {
        ModuleItems::Flashcard(items) => {
            ModuleItems::Flashcard(filter_items(meta, items, &options, rng))
        }
        ModuleItems::Quiz(items) => ModuleItems::Quiz(filter_items(meta, items, &options, rng)),
        ModuleItems::Completion(items) => {
            ModuleItems::Completion(filter_items(meta, items, &options, rng))
        }
        ModuleItems::Matching(items) => {
            ModuleItems::Matching(filter_items(meta, items, &options, rng))
        }
        ModuleItems::Sorting(categories) => ModuleItems::Sorting(
            categories
                .into_iter()
                .map(|mut category| {
                    category.items.retain(|word| options.accepts(word, meta));
                    category
                })
                .filter(|category| !category.items.is_empty())
                .collect(),
        ),
    };

    tracing::debug!(module = %meta.id, %kind, before, after = items.len(), "filtered module content");

    ModuleContent {
        meta: content.meta,
        items,
        tip: content.tip,
        explanation: content.explanation,
    }
}

/// Modules visible in the menu under the current filters.
pub fn filter_modules<'m>(modules: &'m [ModuleMeta], settings: &Settings) -> Vec<&'m ModuleMeta> {
    modules
        .iter()
        .filter(|module| {
            FilterOptions::from_settings(settings, module.exercise_kind).accepts(*module, module)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModuleLevels, SortingCategory};
    use pretty_assertions::assert_eq;

    fn module(kind: ExerciseKind, level: &str, category: &str) -> ModuleMeta {
        ModuleMeta {
            id: format!("{kind}-{level}-{category}"),
            exercise_kind: kind,
            level: ModuleLevels::One(level.to_string()),
            category: category.to_string(),
            title: None,
        }
    }

    fn card(front: &str, level: Option<&str>, category: Option<&str>) -> FlashcardItem {
        FlashcardItem {
            front: front.to_string(),
            back: front.to_uppercase(),
            phonetic_hint: None,
            example_front: None,
            example_back: None,
            level: level.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    fn settings(level: &str, categories: &[&str], random: bool) -> Settings {
        Settings {
            level: LevelFilter::from(level.to_string()),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            random_mode: random,
            ..Settings::default()
        }
    }

    #[test]
    fn items_inherit_module_tags() {
        let meta = module(ExerciseKind::Flashcard, "A1", "food");
        let items = vec![
            card("pain", None, None),
            card("vin", Some("B1"), None),
            card("train", None, Some("travel")),
        ];
        let settings = settings("A1", &["food"], false);
        let options = FilterOptions::from_settings(&settings, ExerciseKind::Flashcard);
        let kept = filter_items(&meta, items, &options, &mut SessionRng::seeded(0));
        let fronts: Vec<_> = kept.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["pain"]);
    }

    #[test]
    fn stable_order_without_random_mode() {
        let meta = module(ExerciseKind::Flashcard, "A1", "food");
        let items: Vec<_> = (0..10).map(|i| card(&i.to_string(), None, None)).collect();
        let mut settings = settings("all", &[], false);
        settings.counts.flashcard = 3;
        let options = FilterOptions::from_settings(&settings, ExerciseKind::Flashcard);
        let kept = filter_items(&meta, items, &options, &mut SessionRng::seeded(0));
        let fronts: Vec<_> = kept.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["0", "1", "2"]);
    }

    #[test]
    fn seeded_random_mode_is_deterministic() {
        let meta = module(ExerciseKind::Flashcard, "A1", "food");
        let items: Vec<_> = (0..10).map(|i| card(&i.to_string(), None, None)).collect();
        let settings = settings("all", &[], true);
        let options = FilterOptions::from_settings(&settings, ExerciseKind::Flashcard);
        let a = filter_items(&meta, items.clone(), &options, &mut SessionRng::seeded(42));
        let b = filter_items(&meta, items, &options, &mut SessionRng::seeded(42));
        assert_eq!(a, b);
    }

    #[test]
    fn sorting_ignores_category_filter() {
        let content = ModuleContent {
            meta: module(ExerciseKind::Sorting, "A1", "grammar"),
            items: ModuleItems::Sorting(vec![SortingCategory {
                category_id: "masc".to_string(),
                display_name: "Masculine".to_string(),
                items: vec![
                    SortingWord {
                        word: "livre".to_string(),
                        category_id: "masc".to_string(),
                        level: None,
                    },
                    SortingWord {
                        word: "fromage".to_string(),
                        category_id: "masc".to_string(),
                        level: Some("B2".to_string()),
                    },
                ],
            }]),
            tip: None,
            explanation: None,
        };
        let settings = settings("A1", &["food"], false);
        let filtered = filter_content(content, &settings, &mut SessionRng::seeded(0));
        assert_eq!(filtered.items.len(), 1);
    }

    #[test]
    fn module_menu_filter() {
        let modules = vec![
            module(ExerciseKind::Quiz, "A1", "food"),
            module(ExerciseKind::Quiz, "A2", "food"),
            module(ExerciseKind::Quiz, "A1", "travel"),
            module(ExerciseKind::Sorting, "A1", "grammar"),
        ];
        let settings = settings("A1", &["food"], false);
        let visible: Vec<_> = filter_modules(&modules, &settings)
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(visible, vec!["quiz-A1-food", "sorting-A1-grammar"]);
    }
}
