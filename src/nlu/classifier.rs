//! Regex-scoring intent classifier.
//!
//! Every pattern of every intent is tried as a case-insensitive search. A hit
//! is scored by how many of the pattern's literal words also occur in the
//! utterance, plus a flat bonus for the regex having matched at all. The best
//! score across the whole table wins; ties go to the first intent/pattern in
//! table order.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use super::patterns::IntentTable;

/// Flat bonus added to every matching pattern's word overlap.
pub const MATCH_BONUS: f64 = 0.3;

/// Similarity used when a pattern has no literal words left after stripping.
pub const EMPTY_PATTERN_SIMILARITY: f64 = 0.5;

/// Regex metacharacters removed before word comparison.
const METACHARACTERS: &[char] = &[
    '.', '*', '[', ']', '(', ')', '{', '}', '\\', '|', '+', '?', '^', '$',
];

/// Best intent for an utterance. `intent` is `None` exactly when `confidence` is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Option<String>,
    pub confidence: f64,
    pub pattern: Option<String>,
}

impl Classification {
    /// The no-match result.
    pub fn none() -> Self {
        Self {
            intent: None,
            confidence: 0.0,
            pattern: None,
        }
    }
}

struct CompiledPattern {
    source: String,
    regex: Regex,
    words: HashSet<String>,
}

struct CompiledIntent {
    id: String,
    patterns: Vec<CompiledPattern>,
}

/// Classifier compiled from an [`IntentTable`]. Immutable; rebuild on table change.
pub struct IntentClassifier {
    intents: Vec<CompiledIntent>,
}

impl IntentClassifier {
    /// Compile every pattern in `table`. Patterns that fail to compile are
    /// skipped with a warning.
    pub fn new(table: &IntentTable) -> Self {
        let intents = table
            .iter()
            .map(|intent| CompiledIntent {
                id: intent.id.clone(),
                patterns: intent
                    .patterns
                    .iter()
                    .filter_map(|source| {
                        match RegexBuilder::new(source).case_insensitive(true).build() {
                            Ok(regex) => Some(CompiledPattern {
                                source: source.clone(),
                                regex,
                                words: pattern_words(source),
                            }),
                            Err(e) => {
                                tracing::warn!(
                                    intent = %intent.id,
                                    pattern = %source,
                                    error = %e,
                                    "skipping invalid pattern"
                                );
                                None
                            }
                        }
                    })
                    .collect(),
            })
            .collect();
        Self { intents }
    }

    /// Score `text` against every pattern and return the best match.
    pub fn classify(&self, text: &str) -> Classification {
        let normalized = text.trim().to_lowercase();
        let text_words: HashSet<&str> = normalized.split_whitespace().collect();

        let mut best = Classification::none();
        for intent in &self.intents {
            for pattern in &intent.patterns {
                if !pattern.regex.is_match(&normalized) {
                    continue;
                }
                let score = score_match(&text_words, &pattern.words);
                // Strict comparison: the first pattern seen keeps a tie.
                if score > best.confidence {
                    best = Classification {
                        intent: Some(intent.id.clone()),
                        confidence: score,
                        pattern: Some(pattern.source.clone()),
                    };
                }
            }
        }
        best
    }

    /// Number of compiled patterns across all intents.
    pub fn pattern_count(&self) -> usize {
        self.intents.iter().map(|i| i.patterns.len()).sum()
    }
}

impl std::fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentClassifier")
            .field(
                "intents",
                &self.intents.iter().map(|i| &i.id).collect::<Vec<_>>(),
            )
            .field("patterns", &self.pattern_count())
            .finish()
    }
}

/// Lowercased literal words of a pattern, metacharacters replaced by spaces.
fn pattern_words(pattern: &str) -> HashSet<String> {
    pattern
        .to_lowercase()
        .replace(METACHARACTERS, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Word-overlap similarity plus the match bonus, capped at 1.0.
fn score_match(text_words: &HashSet<&str>, pattern_words: &HashSet<String>) -> f64 {
    let similarity = if pattern_words.is_empty() {
        EMPTY_PATTERN_SIMILARITY
    } else {
        let shared = pattern_words
            .iter()
            .filter(|w| text_words.contains(w.as_str()))
            .count();
        shared as f64 / pattern_words.len() as f64
    };
    (similarity + MATCH_BONUS).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(&IntentTable::defaults())
    }

    #[test]
    fn refactor_request_is_recognised() {
        let result = classifier().classify("코드를 정리해줘");
        assert_eq!(result.intent.as_deref(), Some("refactor"));
        // "코드를? 정리" shares one of two words: 0.5 + 0.3.
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert_eq!(result.pattern.as_deref(), Some("코드를? 정리"));
    }

    #[test]
    fn exact_word_match_is_capped_at_one() {
        let result = classifier().classify("  STOP ");
        assert_eq!(result.intent.as_deref(), Some("stop"));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn gibberish_has_no_intent() {
        assert_eq!(classifier().classify("xyzzy plugh qwerty"), Classification::none());
    }

    #[test]
    fn empty_input_has_no_intent() {
        assert_eq!(classifier().classify("   "), Classification::none());
    }

    #[test]
    fn regex_hit_without_shared_words_scores_bonus_only() {
        // "종료" matches inside "종료해줘" but the words differ.
        let result = classifier().classify("종료해줘");
        assert_eq!(result.intent.as_deref(), Some("stop"));
        assert!((result.confidence - MATCH_BONUS).abs() < 1e-9);
    }

    #[test]
    fn wordless_pattern_uses_fixed_similarity() {
        let mut table = IntentTable::new();
        table.add_pattern("digits", r"\d+").unwrap();
        table.add_pattern("dots", r"^.+$").unwrap();
        let result = IntentClassifier::new(&table).classify("...");
        assert_eq!(result.intent.as_deref(), Some("dots"));
        assert!((result.confidence - (EMPTY_PATTERN_SIMILARITY + MATCH_BONUS)).abs() < 1e-9);
    }

    #[test]
    fn ties_go_to_first_intent() {
        let mut table = IntentTable::new();
        table.add_pattern("first", "deploy").unwrap();
        table.add_pattern("second", "deploy").unwrap();
        let result = IntentClassifier::new(&table).classify("deploy");
        assert_eq!(result.intent.as_deref(), Some("first"));
    }

    #[test]
    fn classification_is_deterministic_and_bounded() {
        let c = classifier();
        for text in [
            "코드를 정리해줘",
            "please sync and push",
            "help help help",
            "안녕 반가워",
            "",
            "!!!",
            "git push now",
        ] {
            let a = c.classify(text);
            let b = c.classify(text);
            assert_eq!(a, b);
            assert!((0.0..=1.0).contains(&a.confidence));
            assert_eq!(a.intent.is_none(), a.confidence == 0.0);
        }
    }

    #[test]
    fn invalid_loaded_pattern_is_skipped() {
        let json = r#"{"bad": {"patterns": ["(oops", "fine"], "response_templates": []}}"#;
        let table: IntentTable = serde_json::from_str(json).unwrap();
        let c = IntentClassifier::new(&table);
        assert_eq!(c.pattern_count(), 1);
        assert_eq!(c.classify("fine").intent.as_deref(), Some("bad"));
    }

    #[test]
    fn metacharacters_split_alternatives_into_words() {
        let words = pattern_words("(코드|파일).*(정리|개선)");
        let expected: HashSet<String> = ["코드", "파일", "정리", "개선"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(words, expected);
    }
}
