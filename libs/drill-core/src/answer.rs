//! Typed answer comparison for completion exercises.

use serde::{Deserialize, Serialize};

/// Matching mode for typed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    Exact,
    CaseInsensitive,
    Fuzzy,
}

impl Default for MatchingMode {
    fn default() -> Self {
        Self::CaseInsensitive
    }
}

/// Result of comparing a typed answer to the correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    pub matching_mode: MatchingMode,
    pub typed_normalized: String,
    pub correct_normalized: String,
}

/// Compare a typed answer to the correct answer.
pub fn compare_answers(
    typed: &str,
    correct: &str,
    mode: MatchingMode,
    fuzzy_threshold: f64,
) -> MatchResult {
    let typed_normalized = normalize_whitespace(typed);
    let correct_normalized = normalize_whitespace(correct);

    let (is_correct, similarity) = match mode {
        MatchingMode::Exact => {
            let is_correct = typed_normalized == correct_normalized;
            (is_correct, if is_correct { 1.0 } else { 0.0 })
        }
        MatchingMode::CaseInsensitive => {
            let is_correct = typed_normalized.to_lowercase() == correct_normalized.to_lowercase();
            (is_correct, if is_correct { 1.0 } else { 0.0 })
        }
        MatchingMode::Fuzzy => {
            let similarity = normalized_similarity(
                &typed_normalized.to_lowercase(),
                &correct_normalized.to_lowercase(),
            );
            (similarity >= fuzzy_threshold, similarity)
        }
    };

    MatchResult {
        is_correct,
        similarity,
        matching_mode: mode,
        typed_normalized,
        correct_normalized,
    }
}

/// Trim and collapse runs of whitespace.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Similarity in 0.0..=1.0 derived from the edit distance over char counts.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    /// Same in both answers.
    Same,
    /// Present in the correct answer only.
    Added,
    /// Present in the typed answer only.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub text: String,
    pub diff_type: DiffType,
}

impl DiffSegment {
    fn new(text: &str, diff_type: DiffType) -> Self {
        Self {
            text: text.to_string(),
            diff_type,
        }
    }
}

/// Word-level diff between typed and correct answers, with a short look-ahead.
pub fn word_diff(typed: &str, correct: &str) -> Vec<DiffSegment> {
    let typed_words: Vec<&str> = typed.split_whitespace().collect();
    let correct_words: Vec<&str> = correct.split_whitespace().collect();
    let same = |a: &str, b: &str| a.to_lowercase() == b.to_lowercase();

    let mut result = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < typed_words.len() || j < correct_words.len() {
        if i >= typed_words.len() {
            result.push(DiffSegment::new(correct_words[j], DiffType::Added));
            j += 1;
            continue;
        }
        if j >= correct_words.len() {
            result.push(DiffSegment::new(typed_words[i], DiffType::Removed));
            i += 1;
            continue;
        }
        if same(typed_words[i], correct_words[j]) {
            result.push(DiffSegment::new(typed_words[i], DiffType::Same));
            i += 1;
            j += 1;
            continue;
        }

        // Typed word shows up a little later in the correct answer.
        if let Some(k) = (j + 1..correct_words.len().min(j + 3))
            .find(|&k| same(typed_words[i], correct_words[k]))
        {
            for word in &correct_words[j..k] {
                result.push(DiffSegment::new(word, DiffType::Added));
            }
            j = k;
            continue;
        }

        // Correct word shows up a little later in the typed answer.
        if let Some(k) = (i + 1..typed_words.len().min(i + 3))
            .find(|&k| same(correct_words[j], typed_words[k]))
        {
            for word in &typed_words[i..k] {
                result.push(DiffSegment::new(word, DiffType::Removed));
            }
            i = k;
            continue;
        }

        result.push(DiffSegment::new(typed_words[i], DiffType::Removed));
        result.push(DiffSegment::new(correct_words[j], DiffType::Added));
        i += 1;
        j += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("été", "ete"), 2);
    }

    #[test]
    fn test_case_insensitive_trims() {
        let result = compare_answers(" Paris ", "paris", MatchingMode::CaseInsensitive, 0.8);
        assert!(result.is_correct);
        assert_eq!(result.typed_normalized, "Paris");
    }

    #[test]
    fn test_exact_is_case_sensitive() {
        assert!(!compare_answers("Paris", "paris", MatchingMode::Exact, 0.8).is_correct);
        assert!(compare_answers("  paris ", "paris", MatchingMode::Exact, 0.8).is_correct);
    }

    #[test]
    fn test_fuzzy_threshold() {
        assert!(compare_answers("helo", "hello", MatchingMode::Fuzzy, 0.8).is_correct);
        assert!(!compare_answers("xyz", "hello", MatchingMode::Fuzzy, 0.8).is_correct);
    }

    #[test]
    fn test_word_diff_marks_missing_word() {
        let diff = word_diff("je parle", "je ne parle");
        assert_eq!(
            diff,
            vec![
                DiffSegment::new("je", DiffType::Same),
                DiffSegment::new("ne", DiffType::Added),
                DiffSegment::new("parle", DiffType::Same),
            ]
        );
    }
}
