//! Language model client and types
//!
//! Supports Ollama's local generate API.

mod client;
mod traits;
mod types;

pub use client::OllamaClient;
pub use traits::LanguageModel;
pub use types::*;
