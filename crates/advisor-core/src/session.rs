//! Session Management
//!
//! Keeps one isolated state value per conversation. The store is in-memory
//! only. Each session sits behind its own mutex and a turn holds that lock
//! from start to finish, so concurrent turns on one conversation run one
//! after the other while other conversations proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::Result;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A conversation session carrying caller-defined state
#[derive(Clone, Debug)]
pub struct Session<S> {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation state owned by this session
    pub state: S,

    /// Number of user turns handled
    pub turns: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl<S: Default> Session<S> {
    /// Create a new session with a fresh id
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: S::default(),
            turns: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl<S: Default> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Session<S> {
    /// Record one handled turn
    pub fn touch(&mut self) {
        self.turns = self.turns.saturating_add(1);
        self.updated_at = Utc::now();
    }

    /// Time since the last turn
    pub fn idle_for(&self) -> Duration {
        Utc::now() - self.updated_at
    }
}

/// A session shared between the store and the turn currently holding it
pub type SharedSession<S> = Arc<Mutex<Session<S>>>;

/// Session store trait
#[async_trait]
pub trait SessionStore<S: Send + 'static>: Send + Sync {
    /// Handle to a session, creating it if unknown; lock it for the whole turn
    async fn acquire(&self, id: &SessionId) -> Result<SharedSession<S>>;

    /// Delete a session; returns whether it existed
    async fn delete(&self, id: &SessionId) -> Result<bool>;

    /// Number of stored sessions
    async fn len(&self) -> usize;
}

/// In-memory session store
pub struct MemorySessionStore<S> {
    sessions: RwLock<HashMap<SessionId, SharedSession<S>>>,
    idle_ttl: Duration,
}

impl<S> Default for MemorySessionStore<S> {
    fn default() -> Self {
        Self::new(Duration::hours(2))
    }
}

impl<S> MemorySessionStore<S> {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Drop sessions idle for longer than the TTL; returns how many were removed.
    /// Sessions locked by an in-flight turn are kept.
    pub async fn purge_idle(&self) -> usize {
        let ttl = self.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => session.idle_for() <= ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }
}

#[async_trait]
impl<S: Default + Send + Sync + 'static> SessionStore<S> for MemorySessionStore<S> {
    async fn acquire(&self, id: &SessionId) -> Result<SharedSession<S>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Ok(session.clone());
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session = %id, "Starting new session");
            Arc::new(Mutex::new(Session::with_id(id.clone())))
        });
        Ok(session.clone())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Pending(Option<String>);

    #[test]
    fn test_session_creation() {
        let session: Session<Pending> = Session::new();
        assert_eq!(session.turns, 0);
        assert_eq!(session.state, Pending(None));
    }

    #[tokio::test]
    async fn test_state_persists_across_turns() {
        let store = MemorySessionStore::<Pending>::default();
        let id = SessionId::from_string("conv-1");

        {
            let handle = store.acquire(&id).await.unwrap();
            let mut session = handle.lock().await;
            session.state = Pending(Some("Which stock?".into()));
            session.touch();
        }

        let handle = store.acquire(&id).await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.state, Pending(Some("Which stock?".into())));
        assert_eq!(session.turns, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemorySessionStore::<Pending>::default();
        let a = SessionId::from_string("a");
        let b = SessionId::from_string("b");

        let handle = store.acquire(&a).await.unwrap();
        let mut held = handle.lock().await;
        held.state = Pending(Some("capital?".into()));

        // Another conversation is not blocked by the held lock
        let other = store.acquire(&b).await.unwrap();
        let other = other.try_lock().expect("independent session lock");
        assert_eq!(other.state, Pending(None));
    }

    #[tokio::test]
    async fn test_concurrent_turns_are_serialized() {
        let store = Arc::new(MemorySessionStore::<Pending>::default());
        let id = SessionId::from_string("busy");

        let first = store.acquire(&id).await.unwrap();
        let mut turn = first.lock().await;

        let (store2, id2) = (store.clone(), id.clone());
        let second = tokio::spawn(async move {
            let handle = store2.acquire(&id2).await.unwrap();
            let mut session = handle.lock().await;
            session.touch();
            (session.state.clone(), session.turns)
        });

        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(!second.is_finished());

        turn.state = Pending(Some("Which stock?".into()));
        turn.touch();
        drop(turn);

        let (state, turns) = second.await.unwrap();
        assert_eq!(state, Pending(Some("Which stock?".into())));
        assert_eq!(turns, 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_during_turn() {
        let store = MemorySessionStore::<Pending>::default();
        let id = SessionId::from_string("gone");

        let handle = store.acquire(&id).await.unwrap();
        let mut session = handle.lock().await;
        assert!(store.delete(&id).await.unwrap());
        session.state = Pending(Some("late".into()));
        drop(session);

        assert_eq!(store.len().await, 0);
        assert!(!store.delete(&id).await.unwrap());

        let fresh = store.acquire(&id).await.unwrap();
        assert_eq!(fresh.lock().await.state, Pending(None));
    }

    #[tokio::test]
    async fn test_purge_skips_locked_sessions() {
        let store = MemorySessionStore::<Pending>::new(Duration::zero());

        let idle = store.acquire(&SessionId::from_string("idle")).await.unwrap();
        idle.lock().await.updated_at = Utc::now() - Duration::minutes(1);

        let busy = store.acquire(&SessionId::from_string("busy")).await.unwrap();
        let mut held = busy.lock().await;
        held.updated_at = Utc::now() - Duration::minutes(1);

        assert_eq!(store.purge_idle().await, 1);
        assert_eq!(store.len().await, 1);

        drop(held);
        assert_eq!(store.purge_idle().await, 1);
        assert_eq!(store.len().await, 0);
    }
}
