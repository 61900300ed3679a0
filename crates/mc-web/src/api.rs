//! Chat API types and handlers
//!
//! JSON endpoints backing the chat page. Each browser tab owns one session;
//! the page keeps the session id and sends it with every call.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use mc_core::{ChatOrchestrator, Message, SessionManager};

use crate::error::{Result, WebError};
use crate::page::INDEX_HTML;

/// State shared across handlers
#[derive(Clone)]
pub struct ChatState {
    /// Shared, read-only orchestrator
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Live sessions
    pub sessions: Arc<SessionManager>,
}

impl ChatState {
    /// Create a new chat state
    pub fn new(orchestrator: Arc<ChatOrchestrator>, sessions: Arc<SessionManager>) -> Self {
        Self {
            orchestrator,
            sessions,
        }
    }
}

/// Orchestrator readiness, shown as a notice on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub model: Option<String>,
    pub error: Option<String>,
}

/// Returned when a session is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Session summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chat submission payload
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// User message
    pub content: String,
}

/// Chat submission result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Assistant reply (model text, or an error/placeholder text)
    pub reply: Message,
    /// Transcript length after the exchange
    pub message_count: usize,
}

/// Create the chat router
pub fn create_router(state: ChatState) -> Router {
    Router::new()
        .route("/", get(chat_index))
        .route("/api/health", get(health_check))
        .route("/api/status", get(status))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(session_info).delete(end_session))
        .route("/api/sessions/{id}/messages", get(list_messages).post(send_message))
        .route("/api/sessions/{id}/history", delete(clear_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Chat page
async fn chat_index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mistral-chat"
    }))
}

/// Report whether the model is usable
async fn status(State(state): State<ChatState>) -> Json<StatusResponse> {
    let orchestrator = &state.orchestrator;
    Json(StatusResponse {
        ready: orchestrator.is_ready(),
        model: orchestrator.model_name().map(str::to_string),
        error: orchestrator
            .init_error()
            .map(|e| format!("Error initializing Mistral model: {}", e)),
    })
}

/// Start a new session
async fn create_session(State(state): State<ChatState>) -> impl IntoResponse {
    let (session_id, _) = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// Get a session summary
async fn session_info(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> Result<Json<SessionInfo>> {
    let handle = state.sessions.get(&id).await?;
    let session = handle.lock().await;

    Ok(Json(SessionInfo {
        session_id: session.id.clone(),
        message_count: session.message_count(),
        created_at: session.created_at,
        updated_at: session.updated_at,
    }))
}

/// Get the full transcript
async fn list_messages(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>> {
    let handle = state.sessions.get(&id).await?;
    let session = handle.lock().await;
    Ok(Json(session.transcript().to_vec()))
}

/// Submit one user message and wait for the reply
async fn send_message(
    State(state): State<ChatState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>> {
    let handle = state.sessions.get(&id).await?;

    let Json(req) = payload?;
    if req.content.trim().is_empty() {
        return Err(WebError::InvalidRequest("message content is empty".to_string()));
    }

    // held across the model call: one submission at a time per session
    let mut session = handle.lock().await;

    debug!("Session {} submission: {} chars", id, req.content.len());
    let reply = state.orchestrator.chat(&mut session, &req.content).await;

    Ok(Json(SendMessageResponse {
        reply,
        message_count: session.message_count(),
    }))
}

/// Reset transcript and memory
async fn clear_history(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;
    state.orchestrator.clear_history(&mut session);
    Ok(StatusCode::NO_CONTENT)
}

/// End a session
async fn end_session(
    State(state): State<ChatState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.sessions.remove(&id).await?;
    info!("Session {} closed by client", id);
    Ok(StatusCode::NO_CONTENT)
}
