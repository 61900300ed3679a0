//! Session management module
//!
//! Per-session transcript and conversation memory, kept in memory only.

mod manager;
mod types;

pub use manager::{SessionHandle, SessionManager};
pub use types::{Message, Reply, Role, Session};
