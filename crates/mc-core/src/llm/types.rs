//! Ollama API types

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Always false: the whole reply is returned in a single response
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options passed through to the model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
}

/// Response body of a non-streaming `POST /api/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub done: bool,
    /// Total generation time in nanoseconds
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Number of tokens in the prompt
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of tokens generated
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Response body of `GET /api/tags`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// A locally available model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

impl TagsResponse {
    /// Whether `model` is installed, treating a bare name as `name:latest`
    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|tag| {
            tag.name == model
                || (!model.contains(':') && tag.name == format!("{}:latest", model))
        })
    }
}

/// Error body returned by Ollama on failures
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
