//! Conversation buffer injected into prompts as history

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::memory::Exchange;

const HUMAN_PREFIX: &str = "Human";
const AI_PREFIX: &str = "AI";

/// Ordered record of past exchanges for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationMemory {
    exchanges: Vec<Exchange>,
}

impl ConversationMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed exchange
    pub fn record(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.exchanges.push(Exchange::new(human, ai));
        debug!("Memory now holds {} exchanges", self.exchanges.len());
    }

    /// Forget every exchange
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Number of recorded exchanges
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Check if memory is empty
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Render the buffer for the `{history}` slot
    ///
    /// Each exchange becomes a `Human: ...` line followed by an `AI: ...`
    /// line; an empty memory renders as the empty string.
    pub fn to_history_text(&self) -> String {
        self.exchanges
            .iter()
            .flat_map(|e| {
                [
                    format!("{}: {}", HUMAN_PREFIX, e.human),
                    format!("{}: {}", AI_PREFIX, e.ai),
                ]
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_memory_renders_empty() {
        let memory = ConversationMemory::new();
        assert!(memory.is_empty());
        assert_eq!(memory.to_history_text(), "");
    }

    #[test]
    fn test_history_text_keeps_order() {
        let mut memory = ConversationMemory::new();
        memory.record("Hello", "Hi! How can I help?");
        memory.record("Hi", "Hello again.");

        assert_eq!(memory.len(), 2);
        assert_eq!(
            memory.to_history_text(),
            "Human: Hello\nAI: Hi! How can I help?\nHuman: Hi\nAI: Hello again."
        );
        assert_eq!(memory.exchanges[0].human, "Hello");
        assert_eq!(memory.exchanges[1].ai, "Hello again.");
    }

    #[test]
    fn test_multiline_reply_is_kept_verbatim() {
        let mut memory = ConversationMemory::new();
        memory.record("List two", "1. one\n2. two");
        assert_eq!(memory.to_history_text(), "Human: List two\nAI: 1. one\n2. two");
    }

    #[test]
    fn test_clear() {
        let mut memory = ConversationMemory::new();
        memory.clear();
        assert!(memory.is_empty());

        memory.record("a", "b");
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.to_history_text(), "");
    }
}
