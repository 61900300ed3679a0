//! Language model trait definition
//!
//! The orchestrator talks to the model only through this trait, so the
//! Ollama client can be swapped for a scripted model in tests.

use async_trait::async_trait;

use crate::Result;

/// A text-in, text-out language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Get the model identifier (shown in the UI and logs)
    fn model_name(&self) -> &str;

    /// Generate a completion for a fully formatted prompt
    ///
    /// # Arguments
    /// * `prompt` - The prompt text, already rendered from the template
    ///
    /// # Returns
    /// The generated text, verbatim
    async fn generate(&self, prompt: &str) -> Result<String>;
}
