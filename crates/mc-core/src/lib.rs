//! mc-core: Mistral Chat Core Library
//!
//! Ollama client, prompt template, conversation memory, sessions and the
//! orchestrator that ties them together.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use config::{Config, OllamaConfig, PromptConfig, ServerConfig};
pub use error::{Error, Result};
pub use llm::{LanguageModel, OllamaClient};
pub use memory::{ConversationMemory, Exchange};
pub use orchestrator::{ChatOrchestrator, GENERATION_ERROR_PREFIX, MODEL_NOT_INITIALIZED};
pub use prompt::PromptTemplate;
pub use session::{Message, Reply, Role, Session, SessionHandle, SessionManager};
