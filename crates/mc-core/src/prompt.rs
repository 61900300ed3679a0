//! Prompt template with `{history}` and `{human_input}` slots

use crate::{Error, Result};

/// Slot receiving the serialized conversation memory
pub const HISTORY_SLOT: &str = "history";

/// Slot receiving the raw user input
pub const INPUT_SLOT: &str = "human_input";

/// Template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "You are a helpful AI assistant. Use the following conversation history and current input to provide a helpful response.

Conversation History:
{history}

Current Input: {human_input}

Assistant Response:";

/// A fixed prompt template with two named slots
///
/// Rendering is a single pass over the template text, so slot markers that
/// show up inside the history or the user input are never expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template, checking that both slots are present
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();

        for slot in [HISTORY_SLOT, INPUT_SLOT] {
            if !template.contains(&format!("{{{}}}", slot)) {
                return Err(Error::Template(format!("missing {{{}}} slot", slot)));
            }
        }

        Ok(Self { template })
    }

    /// Build from an optional configured template, falling back to the default
    pub fn from_config(template: Option<&str>) -> Result<Self> {
        match template {
            Some(t) => Self::new(t),
            None => Ok(Self::default()),
        }
    }

    /// Render the prompt
    pub fn format(&self, history: &str, human_input: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + history.len() + human_input.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let value = after.find('}').and_then(|end| match &after[..end] {
                HISTORY_SLOT => Some((history, end)),
                INPUT_SLOT => Some((human_input, end)),
                _ => None,
            });

            match value {
                Some((value, end)) => {
                    out.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    // unknown marker or stray brace, copied as-is
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
