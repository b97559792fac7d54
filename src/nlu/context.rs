//! Bounded recent-utterance history.

use std::collections::VecDeque;

/// Default number of utterances retained.
pub const DEFAULT_CONTEXT_CAPACITY: usize = 5;

/// FIFO window of the most recent utterances; the oldest is evicted first.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    turns: VecDeque<String>,
    capacity: usize,
}

impl ConversationContext {
    /// Create a window holding at most `capacity` utterances (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an utterance, evicting the oldest when full.
    pub fn append(&mut self, text: impl Into<String>) {
        self.turns.push_back(text.into());
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Owned copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.turns.iter().cloned().collect()
    }

    /// The most recent utterance.
    pub fn last(&self) -> Option<&str> {
        self.turns.back().map(String::as_str)
    }

    /// Maximum number of utterances kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of recorded utterances.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_five_in_order() {
        let mut ctx = ConversationContext::default();
        for i in 0..8 {
            ctx.append(format!("utterance {i}"));
        }
        let snap = ctx.snapshot();
        assert_eq!(snap.len(), 5);
        assert_eq!(
            snap,
            (3..8).map(|i| format!("utterance {i}")).collect::<Vec<_>>()
        );
        assert_eq!(ctx.last(), Some("utterance 7"));
    }

    #[test]
    fn snapshot_is_detached() {
        let mut ctx = ConversationContext::new(2);
        ctx.append("a");
        let mut snap = ctx.snapshot();
        snap.push("tampered".into());
        assert_eq!(ctx.snapshot(), vec!["a".to_string()]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut ctx = ConversationContext::new(0);
        ctx.append("a");
        ctx.append("b");
        assert_eq!(ctx.capacity(), 1);
        assert_eq!(ctx.snapshot(), vec!["b".to_string()]);
    }
}
