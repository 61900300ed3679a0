//! Session management

use chrono::{TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::session::Session;
use crate::{Error, Result};

/// Shared handle to one session; the lock serializes submissions
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory registry of live sessions
///
/// Every session owns its own transcript and memory; nothing is shared
/// between entries and nothing outlives the process.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    /// Create an empty session manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session and return its id
    pub async fn create(&self) -> (String, SessionHandle) {
        let session = Session::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), Arc::clone(&handle));
        info!("Created session {} ({} active)", id, sessions.len());

        (id, handle)
    }

    /// Look up an existing session
    pub async fn get(&self, id: &str) -> Result<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// End a session, dropping its transcript and memory
    pub async fn remove(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(id) {
            Some(_) => {
                info!("Ended session {}", id);
                Ok(())
            }
            None => Err(Error::SessionNotFound(id.to_string())),
        }
    }

    /// Drop sessions with no activity for longer than `max_idle`
    ///
    /// A session whose lock is held is mid-submission and is kept.
    /// Returns the number of sessions removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = TimeDelta::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(session) if session.updated_at < cutoff => {
                debug!("Evicting idle session {}", id);
                false
            }
            _ => true,
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle session(s) ({} active)", evicted, sessions.len());
        }
        evicted
    }

    /// Get session count
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Reply;

    #[tokio::test]
    async fn test_create_and_get() {
        let manager = SessionManager::new();
        let (id, handle) = manager.create().await;

        let fetched = manager.get(&id).await.unwrap();
        assert!(Arc::ptr_eq(&handle, &fetched));
        assert_eq!(manager.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let manager = SessionManager::new();
        let err = manager.get("missing").await.err().unwrap();
        assert!(matches!(err, Error::SessionNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new();
        let (_, a) = manager.create().await;
        let (_, b) = manager.create().await;

        a.lock().await.record_exchange("Hello", &Reply::Generated("Hi".to_string()));

        let b = b.lock().await;
        assert!(b.is_empty());
        assert!(b.memory().is_empty());
        assert_eq!(a.lock().await.message_count(), 2);
    }

    #[tokio::test]
    async fn test_remove() {
        let manager = SessionManager::new();
        let (id, _) = manager.create().await;

        manager.remove(&id).await.unwrap();
        assert_eq!(manager.session_count().await, 0);
        assert!(manager.get(&id).await.is_err());
        assert!(matches!(manager.remove(&id).await, Err(Error::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_evict_idle_removes_expired_sessions() {
        let manager = SessionManager::new();
        let (stale, stale_handle) = manager.create().await;
        let (fresh, _) = manager.create().await;

        stale_handle.lock().await.updated_at = Utc::now() - TimeDelta::hours(2);

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)).await, 1);
        assert!(manager.get(&stale).await.is_err());
        assert!(manager.get(&fresh).await.is_ok());

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)).await, 0);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_busy_sessions() {
        let manager = SessionManager::new();
        let (id, handle) = manager.create().await;

        let mut session = handle.lock().await;
        session.updated_at = Utc::now() - TimeDelta::hours(2);

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)).await, 0);
        drop(session);

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)).await, 1);
        assert!(manager.get(&id).await.is_err());
    }
}
