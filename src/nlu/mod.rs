//! Intent classification engine.
//!
//! Turns a raw utterance into a [`ClassificationResult`]: the best-matching
//! intent and its confidence, extracted entities, an emotion tag, and a
//! templated reply. Patterns come from a [`PatternStore`] and can be extended
//! at runtime with [`IntentEngine::learn`].

pub mod classifier;
pub mod context;
pub mod emotion;
pub mod entities;
pub mod patterns;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::PatternResult;

pub use classifier::{Classification, IntentClassifier};
pub use context::ConversationContext;
pub use emotion::Emotion;
pub use entities::{Entities, EntityValue};
pub use patterns::{Intent, IntentTable, PatternStore};

/// Reply for utterances that could not be routed.
pub const CLARIFICATION: &str = "죄송해요, 무슨 말씀인지 잘 모르겠어요. 다시 말씀해 주시겠어요?";

/// Everything the engine knows about one utterance.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// Best intent, `None` when nothing matched.
    pub intent: Option<String>,
    /// Score in [0, 1]; 0 exactly when `intent` is `None`.
    pub confidence: f64,
    /// Source of the winning pattern.
    pub matched_pattern: Option<String>,
    pub entities: Entities,
    pub emotion: Emotion,
    /// Templated reply for the intent, or [`CLARIFICATION`].
    pub response: String,
}

/// Pattern table, compiled classifier, and template picker.
pub struct IntentEngine {
    table: IntentTable,
    classifier: IntentClassifier,
    store: Option<PatternStore>,
    rng: StdRng,
}

impl IntentEngine {
    /// Build an engine over `table` with no backing file.
    ///
    /// `seed` pins response-template selection; `None` seeds from entropy.
    pub fn new(table: IntentTable, seed: Option<u64>) -> Self {
        let classifier = IntentClassifier::new(&table);
        Self {
            table,
            classifier,
            store: None,
            rng: rng_from_seed(seed),
        }
    }

    /// Load the table from `store` (falling back to defaults) and keep the
    /// store for persisting learned patterns.
    pub fn with_store(store: PatternStore, seed: Option<u64>) -> Self {
        let table = store.load();
        let mut engine = Self::new(table, seed);
        engine.store = Some(store);
        engine
    }

    /// Best intent for `text`. Pure with respect to the current table.
    pub fn classify(&self, text: &str) -> Classification {
        self.classifier.classify(text)
    }

    /// Classify, extract entities, tag emotion, and pick a reply.
    pub fn analyze(&mut self, text: &str) -> ClassificationResult {
        let Classification {
            intent,
            confidence,
            pattern,
        } = self.classify(text);
        let entities = entities::extract(text, intent.as_deref());
        let emotion = emotion::tag(text, intent.as_deref());
        let response = match intent.as_deref() {
            Some(id) => self.respond(id),
            None => CLARIFICATION.to_string(),
        };

        tracing::debug!(
            intent = intent.as_deref().unwrap_or("-"),
            confidence,
            %emotion,
            "classified utterance"
        );

        ClassificationResult {
            intent,
            confidence,
            matched_pattern: pattern,
            entities,
            emotion,
            response,
        }
    }

    /// Pick one of the intent's response templates.
    pub fn respond(&mut self, intent: &str) -> String {
        self.table
            .get(intent)
            .and_then(|i| i.response_templates.choose(&mut self.rng))
            .cloned()
            .unwrap_or_else(|| patterns::generic_template(intent))
    }

    /// Add `pattern` to `intent` and persist the table.
    ///
    /// An invalid pattern is rejected. A persist failure is logged and the
    /// in-memory table stays authoritative.
    pub fn learn(&mut self, intent: &str, pattern: &str) -> PatternResult<()> {
        self.table.add_pattern(intent, pattern)?;
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.table) {
                tracing::warn!(error = %e, intent, "failed to persist learned pattern");
            }
        }
        self.classifier = IntentClassifier::new(&self.table);
        tracing::info!(intent, pattern, "learned pattern");
        Ok(())
    }

    /// The current intent table.
    pub fn table(&self) -> &IntentTable {
        &self.table
    }
}

impl std::fmt::Debug for IntentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentEngine")
            .field("classifier", &self.classifier)
            .field("store", &self.store.as_ref().map(|s| s.path()))
            .finish()
    }
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
