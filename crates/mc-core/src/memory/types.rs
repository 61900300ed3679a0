//! Memory type definitions for mc-core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed exchange: the user's input and the model's reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exchange {
    /// What the user sent
    pub human: String,
    /// What the model generated
    pub ai: String,
    /// When the exchange was recorded
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    /// Create a new exchange stamped with the current time
    pub fn new(human: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            ai: ai.into(),
            created_at: Utc::now(),
        }
    }
}
