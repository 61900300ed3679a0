//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::memory::ConversationMemory;

/// Who wrote a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A transcript entry; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Outcome of asking the model for a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text produced by the model
    Generated(String),
    /// Placeholder or error text shown in place of a model reply
    Unavailable(String),
}

impl Reply {
    /// Text to show as the assistant turn
    pub fn text(&self) -> &str {
        match self {
            Reply::Generated(text) | Reply::Unavailable(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Generated(text) | Reply::Unavailable(text) => text,
        }
    }
}

/// Represents one interactive conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Displayed messages, in submission order
    transcript: Vec<Message>,
    /// History fed back into prompts
    memory: ConversationMemory,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with a random id
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    /// Create a new session with a given id
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            transcript: Vec::new(),
            memory: ConversationMemory::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record one submission and its reply
    ///
    /// The transcript always gains a user and an assistant message. Memory
    /// only gains the exchange when the reply came from the model, so error
    /// text is never fed back into later prompts.
    pub fn record_exchange(&mut self, user_input: &str, reply: &Reply) {
        self.transcript.push(Message::user(user_input));
        self.transcript.push(Message::assistant(reply.text()));

        if let Reply::Generated(text) = reply {
            self.memory.record(user_input, text.as_str());
        }

        self.updated_at = Utc::now();
    }

    /// Clear transcript and memory together
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.memory.clear();
        self.updated_at = Utc::now();
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Check if session is empty
    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
