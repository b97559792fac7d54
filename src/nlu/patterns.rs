//! Pattern store: the intent table and its JSON backing file.
//!
//! The table maps each intent name to an ordered list of regex patterns and
//! a list of response templates. Intent order is significant (it decides
//! classifier ties), so the table is a `Vec` and the JSON object is written
//! and read in insertion order.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PatternError, PatternResult};

/// A named user goal with its match patterns and reply templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub id: String,
    pub patterns: Vec<String>,
    pub response_templates: Vec<String>,
}

/// On-disk body of one intent (the id is the enclosing JSON key).
#[derive(Serialize, Deserialize)]
struct IntentBody {
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default)]
    response_templates: Vec<String>,
}

/// Ordered collection of intents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentTable {
    intents: Vec<Intent>,
}

impl IntentTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The six built-in intents used when no pattern file is available.
    pub fn defaults() -> Self {
        let mut table = Self::new();
        let builtin: [(&str, &[&str], &[&str]); 6] = [
            (
                "refactor",
                &["정리해", "코드를? 정리", "리팩토링", "refactor", "clean up"],
                &[
                    "코드 정리를 시작할게요.",
                    "리팩토링을 진행하겠습니다.",
                    "알겠어요, 코드를 깔끔하게 정리해 볼게요.",
                ],
            ),
            (
                "sync",
                &["동기화", "sync", "깃.*(푸시|풀)", "git (push|pull)"],
                &["동기화를 시작합니다.", "저장소를 동기화할게요."],
            ),
            (
                "stop",
                &["그만", "종료", "멈춰", "stop", "exit", "quit"],
                &["알겠습니다. 종료할게요.", "수고하셨습니다!"],
            ),
            (
                "help",
                &["도움", "도와줘", "뭘 할 수 있", "help"],
                &["코드 정리, 동기화, 상태 확인 같은 일을 도와드릴 수 있어요."],
            ),
            (
                "greeting",
                &["안녕", "반가워", "hello", "good morning"],
                &["안녕하세요! 무엇을 도와드릴까요?", "반가워요!"],
            ),
            (
                "status",
                &["상태", "어때", "status", "how are you"],
                &["지금 상태를 확인해 볼게요.", "모든 시스템이 정상이에요."],
            ),
        ];
        for (id, patterns, templates) in builtin {
            table.intents.push(Intent {
                id: id.to_string(),
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
                response_templates: templates.iter().map(|t| t.to_string()).collect(),
            });
        }
        table
    }

    /// Look up an intent by name.
    pub fn get(&self, id: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.id == id)
    }

    /// Iterate intents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }

    /// Number of intents.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Whether the table has no intents.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Append `pattern` to `intent`, creating the intent if needed.
    ///
    /// The pattern must compile. A new intent gets a single generic
    /// response template. Re-adding an existing pattern is a no-op.
    pub fn add_pattern(&mut self, intent: &str, pattern: &str) -> PatternResult<()> {
        let intent = intent.trim();
        if intent.is_empty() {
            return Err(PatternError::EmptyIntent);
        }
        regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| PatternError::InvalidRegex {
                intent: intent.to_string(),
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        match self.intents.iter_mut().find(|i| i.id == intent) {
            Some(existing) => {
                if !existing.patterns.iter().any(|p| p == pattern) {
                    existing.patterns.push(pattern.to_string());
                }
            }
            None => self.intents.push(Intent {
                id: intent.to_string(),
                patterns: vec![pattern.to_string()],
                response_templates: vec![generic_template(intent)],
            }),
        }
        Ok(())
    }
}

/// Reply used for intents that were learned at runtime or carry no templates.
pub(crate) fn generic_template(intent: &str) -> String {
    format!("'{intent}' 요청을 처리할게요.")
}

impl Serialize for IntentTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.intents.len()))?;
        for intent in &self.intents {
            map.serialize_entry(
                &intent.id,
                &IntentBody {
                    patterns: intent.patterns.clone(),
                    response_templates: intent.response_templates.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IntentTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = IntentTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of intent name to patterns and response templates")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut intents: Vec<Intent> = Vec::new();
                while let Some((id, body)) = access.next_entry::<String, IntentBody>()? {
                    // Duplicate keys: the later body wins, the first position is kept.
                    let intent = Intent {
                        id,
                        patterns: body.patterns,
                        response_templates: body.response_templates,
                    };
                    match intents.iter_mut().find(|i| i.id == intent.id) {
                        Some(slot) => *slot = intent,
                        None => intents.push(intent),
                    }
                }
                Ok(IntentTable { intents })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// The JSON document: `{"intents": {...}}`.
#[derive(Serialize, Deserialize)]
struct PatternDocument {
    intents: IntentTable,
}

/// JSON-file backing for an [`IntentTable`].
#[derive(Debug, Clone)]
pub struct PatternStore {
    path: PathBuf,
}

impl PatternStore {
    /// Create a store backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the intent table.
    ///
    /// A missing or unparsable file yields [`IntentTable::defaults`], which is
    /// written back immediately. Neither failure is surfaced to the caller.
    pub fn load(&self) -> IntentTable {
        match self.try_load() {
            Ok(table) => {
                tracing::debug!(path = %self.path.display(), intents = table.len(), "loaded patterns");
                table
            }
            Err(e) => {
                tracing::warn!(error = %e, "pattern file unavailable, using defaults");
                let table = IntentTable::defaults();
                if let Err(e) = self.save(&table) {
                    tracing::warn!(error = %e, "failed to persist default patterns");
                }
                table
            }
        }
    }

    /// Read and parse the backing file without any fallback.
    pub fn try_load(&self) -> PatternResult<IntentTable> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| PatternError::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;
        let doc: PatternDocument =
            serde_json::from_str(&content).map_err(|e| PatternError::Parse {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(doc.intents)
    }

    /// Write `table` to the backing file as pretty-printed JSON.
    pub fn save(&self, table: &IntentTable) -> PatternResult<()> {
        let doc = PatternDocument {
            intents: table.clone(),
        };
        let content =
            serde_json::to_string_pretty(&doc).map_err(|e| PatternError::Serialize {
                message: e.to_string(),
            })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PatternError::Write {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }
        std::fs::write(&self.path, content).map_err(|e| PatternError::Write {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}
