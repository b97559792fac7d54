//! Affect tagging for utterances.
//!
//! Precedence is fixed: urgency beats sentiment, sentiment beats the
//! per-intent default.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_URGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:hurry|now|asap|quick(?:ly)?|urgent(?:ly)?)\b|빨리|급해|급하게|당장|!{2,}")
        .unwrap()
});

static RE_POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:thanks?|thank you|great|good|awesome|nice|love)\b|고마워|감사|좋아|최고|잘했")
        .unwrap()
});

static RE_NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:bad|sad|terrible|awful|hate|annoying)\b|싫어|슬퍼|짜증|최악|힘들")
        .unwrap()
});

/// Fixed affect vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Excited,
    Neutral,
    Success,
    Thinking,
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Happy => write!(f, "happy"),
            Self::Sad => write!(f, "sad"),
            Self::Excited => write!(f, "excited"),
            Self::Neutral => write!(f, "neutral"),
            Self::Success => write!(f, "success"),
            Self::Thinking => write!(f, "thinking"),
        }
    }
}

impl Emotion {
    /// Default affect for an intent when the text itself carries none.
    pub fn for_intent(intent: Option<&str>) -> Self {
        match intent {
            Some("greeting") => Self::Happy,
            Some("refactor") | Some("sync") => Self::Success,
            Some("status") => Self::Thinking,
            // stop, help, and anything unknown.
            _ => Self::Neutral,
        }
    }
}

/// Classify the affect of `text`, falling back to the intent default.
pub fn tag(text: &str, intent: Option<&str>) -> Emotion {
    if RE_URGENT.is_match(text) {
        Emotion::Excited
    } else if RE_POSITIVE.is_match(text) {
        Emotion::Happy
    } else if RE_NEGATIVE.is_match(text) {
        Emotion::Sad
    } else {
        Emotion::for_intent(intent)
    }
}
