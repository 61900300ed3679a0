//! Chat orchestration
//!
//! Turns one user utterance into one assistant reply, using the session's
//! conversation memory as context.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::llm::{LanguageModel, OllamaClient};
use crate::memory::ConversationMemory;
use crate::prompt::PromptTemplate;
use crate::session::{Message, Reply, Session};
use crate::Result;

/// Reply returned for every request while the model is unavailable
pub const MODEL_NOT_INITIALIZED: &str = "Model not initialized. Please check your Ollama setup.";

/// Prefix of replies produced when a model call fails
pub const GENERATION_ERROR_PREFIX: &str = "Error generating response:";

/// Wraps the model client and the prompt template
///
/// Holds no conversation state of its own; sessions are passed in by the
/// caller, so one orchestrator can serve any number of sessions.
pub struct ChatOrchestrator {
    model: Option<Arc<dyn LanguageModel>>,
    template: PromptTemplate,
    init_error: Option<String>,
}

impl ChatOrchestrator {
    /// Connect to the configured Ollama endpoint
    ///
    /// Never fails: on any error the orchestrator is returned in the
    /// not-ready state and the error text is kept for display.
    pub async fn initialize(config: &Config) -> Self {
        match Self::connect(config).await {
            Ok(orchestrator) => {
                info!(
                    "Chat orchestrator ready: model={}, endpoint={}",
                    config.ollama.model, config.ollama.base_url
                );
                orchestrator
            }
            Err(e) => {
                error!("Error initializing Mistral model: {}", e);
                Self::not_ready(e.to_string())
            }
        }
    }

    async fn connect(config: &Config) -> Result<Self> {
        let template = PromptTemplate::from_config(config.prompt.template.as_deref())?;
        let client = OllamaClient::new(&config.ollama)?;
        client.check_connection().await?;

        Ok(Self::with_model(Arc::new(client), template))
    }

    /// Build a ready orchestrator around any model
    pub fn with_model(model: Arc<dyn LanguageModel>, template: PromptTemplate) -> Self {
        Self {
            model: Some(model),
            template,
            init_error: None,
        }
    }

    /// Build an orchestrator that answers every request with the placeholder
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            model: None,
            template: PromptTemplate::default(),
            init_error: Some(reason.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Why initialization failed, if it did
    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    /// Model identifier, if a model is attached
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_name())
    }

    /// Ask the model, without touching any state
    pub async fn generate_reply(&self, memory: &ConversationMemory, user_input: &str) -> Reply {
        let Some(model) = self.model.as_deref() else {
            return Reply::Unavailable(MODEL_NOT_INITIALIZED.to_string());
        };

        let prompt = self.template.format(&memory.to_history_text(), user_input);
        debug!("Prompt after formatting:\n{}", prompt);

        match model.generate(&prompt).await {
            Ok(text) => Reply::Generated(text),
            Err(e) => {
                warn!("Model call failed: {}", e);
                Reply::Unavailable(format!("{} {}", GENERATION_ERROR_PREFIX, e))
            }
        }
    }

    /// Get a reply and record a successful exchange in `memory`
    ///
    /// Failures come back as reply text; this never returns an error.
    pub async fn get_response(&self, memory: &mut ConversationMemory, user_input: &str) -> String {
        let reply = self.generate_reply(memory, user_input).await;
        if let Reply::Generated(text) = &reply {
            memory.record(user_input, text.as_str());
        }
        reply.into_text()
    }

    /// Run one full submission against a session
    ///
    /// Appends the user message and the assistant reply to the transcript
    /// and returns the assistant message.
    pub async fn chat(&self, session: &mut Session, user_input: &str) -> Message {
        let reply = self.generate_reply(session.memory(), user_input).await;
        session.record_exchange(user_input, &reply);

        Message::assistant(reply.into_text())
    }

    /// Reset a session's transcript and memory; readiness is unaffected
    pub fn clear_history(&self, session: &mut Session) {
        session.clear();
        info!("Cleared chat history for session {}", session.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OllamaConfig;
    use crate::session::Role;
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Model that answers with a numbered echo and remembers every prompt
    #[derive(Default)]
    struct ScriptedModel {
        prompts: Mutex<Vec<String>>,
        fail_on: Option<usize>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn failing_on(call: usize) -> Self {
            Self {
                fail_on: Some(call),
                ..Self::default()
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail_on == Some(n) {
                return Err(Error::Ollama("connection reset".to_string()));
            }
            Ok(format!("reply {}", n))
        }
    }

    fn orchestrator(model: Arc<ScriptedModel>) -> ChatOrchestrator {
        ChatOrchestrator::with_model(model, PromptTemplate::default())
    }

    #[tokio::test]
    async fn test_transcript_is_two_per_submission() {
        let orchestrator = orchestrator(Arc::new(ScriptedModel::default()));
        let mut session = Session::new();

        for i in 0..5 {
            orchestrator.chat(&mut session, &format!("question {}", i)).await;
        }

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 10);
        for (i, message) in transcript.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role(), expected);
        }
        assert_eq!(transcript[0].content(), "question 0");
        assert_eq!(transcript[9].content(), "reply 5");
    }

    #[tokio::test]
    async fn test_hello_then_hi() {
        let model = Arc::new(ScriptedModel::default());
        let orchestrator = orchestrator(Arc::clone(&model));
        let mut session = Session::new();

        let reply = orchestrator.chat(&mut session, "Hello").await;
        assert_eq!(reply, Message::assistant("reply 1"));
        assert_eq!(session.transcript(), &[Message::user("Hello"), Message::assistant("reply 1")]);

        orchestrator.chat(&mut session, "Hi").await;
        assert_eq!(session.message_count(), 4);
        assert_eq!(
            session.memory().to_history_text(),
            "Human: Hello\nAI: reply 1\nHuman: Hi\nAI: reply 2"
        );

        // second prompt carries the first exchange as history
        let prompts = model.prompts();
        assert!(prompts[0].contains("Conversation History:\n\n\nCurrent Input: Hello"));
        assert!(prompts[1].contains("Conversation History:\nHuman: Hello\nAI: reply 1\n\nCurrent Input: Hi"));
    }

    #[tokio::test]
    async fn test_not_ready_short_circuits() {
        let orchestrator = ChatOrchestrator::not_ready("connection refused");
        let mut memory = ConversationMemory::new();

        assert!(!orchestrator.is_ready());
        assert_eq!(orchestrator.init_error(), Some("connection refused"));
        assert!(orchestrator.model_name().is_none());

        for input in ["Hello", "Hi", ""] {
            let reply = orchestrator.get_response(&mut memory, input).await;
            assert_eq!(reply, MODEL_NOT_INITIALIZED);
        }
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_becomes_reply_and_loop_continues() {
        let orchestrator = orchestrator(Arc::new(ScriptedModel::failing_on(1)));
        let mut session = Session::new();

        let failed = orchestrator.chat(&mut session, "Hello").await;
        assert!(failed.content().contains("Error generating response:"));
        assert!(failed.content().contains("connection reset"));
        assert!(session.memory().is_empty());

        let next = orchestrator.chat(&mut session, "Still there?").await;
        assert_eq!(next.content(), "reply 2");
        assert_eq!(session.message_count(), 4);
        assert_eq!(session.memory().len(), 1);
    }

    #[tokio::test]
    async fn test_get_response_records_memory() {
        let orchestrator = orchestrator(Arc::new(ScriptedModel::default()));
        let mut memory = ConversationMemory::new();

        let reply = orchestrator.get_response(&mut memory, "Hello").await;
        assert_eq!(reply, "reply 1");
        assert_eq!(memory.to_history_text(), "Human: Hello\nAI: reply 1");
    }

    #[tokio::test]
    async fn test_clear_history_keeps_readiness() {
        let orchestrator = orchestrator(Arc::new(ScriptedModel::default()));
        let mut session = Session::new();

        orchestrator.clear_history(&mut session);
        orchestrator.chat(&mut session, "Hello").await;
        orchestrator.clear_history(&mut session);

        assert!(session.is_empty());
        assert!(session.memory().is_empty());
        assert!(orchestrator.is_ready());
        assert_eq!(orchestrator.chat(&mut session, "again").await.content(), "reply 2");
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_memory() {
        let model = Arc::new(ScriptedModel::default());
        let orchestrator = orchestrator(Arc::clone(&model));
        let mut a = Session::new();
        let mut b = Session::new();

        orchestrator.chat(&mut a, "secret in a").await;
        orchestrator.chat(&mut b, "question in b").await;

        assert_eq!(b.message_count(), 2);
        assert!(!b.memory().to_history_text().contains("secret"));
        assert!(!model.prompts()[1].contains("secret"));
    }

    #[tokio::test]
    async fn test_initialize_against_unreachable_endpoint() {
        let config = Config {
            ollama: OllamaConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                ..OllamaConfig::default()
            },
            ..Config::default()
        };

        let orchestrator = ChatOrchestrator::initialize(&config).await;
        assert!(!orchestrator.is_ready());
        assert!(orchestrator.init_error().is_some());

        let mut memory = ConversationMemory::new();
        assert_eq!(orchestrator.get_response(&mut memory, "Hello").await, MODEL_NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn test_initialize_rejects_bad_template() {
        let mut config = Config::default();
        config.prompt.template = Some("no slots here".to_string());

        let orchestrator = ChatOrchestrator::initialize(&config).await;
        assert!(!orchestrator.is_ready());
        assert!(orchestrator.init_error().unwrap_or_default().contains("template"));
    }

    #[tokio::test]
    async fn test_initialize_and_chat_with_ollama() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{ "name": "mistral:latest" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "mistral",
                "response": "Bonjour!",
                "done": true
            })))
            .mount(&server)
            .await;

        let config = Config {
            ollama: OllamaConfig {
                base_url: server.uri(),
                ..OllamaConfig::default()
            },
            ..Config::default()
        };

        let orchestrator = ChatOrchestrator::initialize(&config).await;
        assert!(orchestrator.is_ready());
        assert_eq!(orchestrator.model_name(), Some("mistral"));

        let mut session = Session::new();
        let reply = orchestrator.chat(&mut session, "Hello").await;
        assert_eq!(reply.content(), "Bonjour!");
        assert_eq!(session.memory().to_history_text(), "Human: Hello\nAI: Bonjour!");
    }

    #[tokio::test]
    async fn test_server_error_after_init_is_reported_as_reply() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "out of memory" })))
            .mount(&server)
            .await;

        let config = Config {
            ollama: OllamaConfig {
                base_url: server.uri(),
                ..OllamaConfig::default()
            },
            ..Config::default()
        };

        let orchestrator = ChatOrchestrator::initialize(&config).await;
        let mut memory = ConversationMemory::new();
        let reply = orchestrator.get_response(&mut memory, "Hello").await;

        assert!(reply.starts_with(GENERATION_ERROR_PREFIX));
        assert!(reply.contains("out of memory"));
        assert!(memory.is_empty());
    }
}
