//! Chat server configuration and startup

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;
use tracing::info;

use mc_core::{ChatOrchestrator, ServerConfig, SessionManager};

use crate::api::{create_router, ChatState};
use crate::error::{Result, WebError};

/// Resolve the bind address from the server configuration
pub fn socket_addr(config: &ServerConfig) -> Result<SocketAddr> {
    let addr = format!("{}:{}", config.host, config.port);
    addr.parse()
        .map_err(|e| WebError::ConfigError(format!("Invalid address '{}': {}", addr, e)))
}

/// Longest wait between idle-session sweeps
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drop sessions idle longer than `max_idle`
pub fn spawn_session_sweeper(
    sessions: Arc<SessionManager>,
    max_idle: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            sessions.evict_idle(max_idle).await;
        }
    })
}

/// Chat web server
pub struct ChatServer {
    config: ServerConfig,
    state: ChatState,
}

impl ChatServer {
    /// Create a new chat server with an empty session registry
    pub fn new(config: ServerConfig, orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self {
            config,
            state: ChatState::new(orchestrator, Arc::new(SessionManager::new())),
        }
    }

    /// Get the router
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let addr = socket_addr(&self.config)?;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| WebError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;

        info!("Chat UI listening on http://{}", addr);

        let sweeper = match self.config.session_idle_secs {
            0 => None,
            secs => {
                let max_idle = Duration::from_secs(secs);
                info!("Sessions idle for {}s are dropped", secs);
                Some(spawn_session_sweeper(
                    Arc::clone(&self.state.sessions),
                    max_idle,
                    max_idle.min(MAX_SWEEP_INTERVAL),
                ))
            }
        };

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| WebError::ServerError(format!("Server error: {}", e)));

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        served
    }
}
