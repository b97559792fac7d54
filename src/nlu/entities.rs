//! Slot extraction: file names, numbers, and intent-specific targets.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\w+\.(?:py|json|js|html|css|txt|md)").unwrap());

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// File extensions recognised as source files.
pub const SOURCE_EXTENSIONS: &[&str] = &["py", "js", "html", "css", "json", "txt", "md"];

/// Words naming a class as the refactor target.
const CLASS_WORDS: &[&str] = &["클래스", "class"];

/// A single extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityValue {
    Text(String),
    List(Vec<String>),
    /// Digit runs exactly as written, so no value is lost to overflow.
    Numbers(Vec<String>),
}

/// Extracted slots keyed by name (`files`, `numbers`, `target`).
pub type Entities = BTreeMap<String, EntityValue>;

/// Pull structured slots out of `text`. Keys are only present when something
/// was found, except `target`, which is always set for `refactor`.
pub fn extract(text: &str, intent: Option<&str>) -> Entities {
    let mut entities = Entities::new();

    let files: Vec<String> = RE_FILE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    if !files.is_empty() {
        entities.insert("files".into(), EntityValue::List(files));
    }

    let numbers: Vec<String> = RE_NUMBER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    if !numbers.is_empty() {
        entities.insert("numbers".into(), EntityValue::Numbers(numbers));
    }

    if intent == Some("refactor") {
        let lower = text.to_lowercase();
        let target = if CLASS_WORDS.iter().any(|w| lower.contains(w)) {
            "class"
        } else {
            "function"
        };
        entities.insert("target".into(), EntityValue::Text(target.into()));
    }

    entities
}
