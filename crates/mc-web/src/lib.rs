//! mc-web: Web chat UI for mistral-chat
//!
//! Serves the chat page and the JSON API it talks to.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mc_core::{ChatOrchestrator, Config};
//! use mc_web::ChatServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let orchestrator = Arc::new(ChatOrchestrator::initialize(&config).await);
//!
//!     let server = ChatServer::new(config.server, orchestrator);
//!     server.run(async { tokio::signal::ctrl_c().await.ok(); }).await.unwrap();
//! }
//! ```

pub mod api;
pub mod error;
pub mod page;
pub mod server;

pub use api::{create_router, ChatState, SendMessageRequest, SendMessageResponse, SessionInfo, StatusResponse};
pub use error::{Result, WebError};
pub use server::{socket_addr, spawn_session_sweeper, ChatServer};
