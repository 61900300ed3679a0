//! Conversation memory
//!
//! Keeps the exchanges of a session and renders them as prompt history.

mod buffer;
mod types;

pub use buffer::ConversationMemory;
pub use types::Exchange;
