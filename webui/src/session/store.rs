//! Session storage contract and implementations.
//!
//! Views need little from a session: a stable identity, and reading,
//! writing and deleting keys. [`SessionStore`] captures exactly that, over
//! JSON values, so views run against the cookie sessions used in production
//! (`tower_sessions::Session`) or the in-process [`MemorySessionStore`] used
//! by tests and single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::session::flash::FLASH_SESSION_KEY;

/// Key/value access to one client session.
///
/// Implementations must provide read-your-writes consistency within a
/// request and durable storage across requests with the same identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stable identity of the session, once one has been assigned.
    ///
    /// A session without an identity has not been sent to the client yet,
    /// so no other request can be sharing it.
    fn session_id(&self) -> Option<String>;

    /// Identity of the session, assigning and persisting one if needed.
    ///
    /// After this returns, the identity will reach the client with the
    /// current response.
    async fn ensure_id(&self) -> Result<String>;

    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    async fn del(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl SessionStore for tower_sessions::Session {
    fn session_id(&self) -> Option<String> {
        self.id().map(|id| id.to_string())
    }

    async fn ensure_id(&self) -> Result<String> {
        // Loading the record clears an id whose session no longer exists
        if self.get_value(FLASH_SESSION_KEY).await?.is_none() {
            self.insert(FLASH_SESSION_KEY, true).await?;
        }

        if let Some(id) = self.id() {
            return Ok(id.to_string());
        }

        // A new session only gets its id from the store when saved
        self.save().await?;
        self.id()
            .map(|id| id.to_string())
            .ok_or_else(|| Error::Session("Session store did not assign an id".to_string()))
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_value(key).await?)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        Ok(self.insert(key, value).await?)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.remove_value(key).await?;
        Ok(())
    }
}

/// In-process session storage shared by all sessions.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, HashMap<String, Value>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the session with the given identity.
    ///
    /// The session springs into existence on first write.
    #[must_use]
    pub fn session(&self, id: impl Into<String>) -> MemorySession {
        MemorySession {
            id: id.into(),
            sessions: Arc::clone(&self.sessions),
        }
    }

    /// Number of sessions holding at least one key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session holds data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// One session inside a [`MemorySessionStore`].
#[derive(Debug, Clone)]
pub struct MemorySession {
    id: String,
    sessions: Arc<DashMap<String, HashMap<String, Value>>>,
}

#[async_trait]
impl SessionStore for MemorySession {
    fn session_id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    async fn ensure_id(&self) -> Result<String> {
        Ok(self.id.clone())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self
            .sessions
            .get(&self.id)
            .and_then(|data| data.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.sessions
            .entry(self.id.clone())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let now_empty = match self.sessions.get_mut(&self.id) {
            Some(mut data) => {
                data.remove(key);
                data.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.sessions.remove_if(&self.id, |_, data| data.is_empty());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_session_roundtrip() {
        let store = MemorySessionStore::new();
        let session = store.session("abc");

        assert_eq!(session.session_id().as_deref(), Some("abc"));
        assert_eq!(session.ensure_id().await.unwrap(), "abc");
        assert_eq!(session.get("k").await.unwrap(), None);

        session.set("k", json!({"a": 1})).await.unwrap();
        assert_eq!(session.get("k").await.unwrap(), Some(json!({"a": 1})));

        session.del("k").await.unwrap();
        assert_eq!(session.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_sessions_are_isolated() {
        let store = MemorySessionStore::new();
        let first = store.session("one");
        let second = store.session("two");

        first.set("user", json!("alice")).await.unwrap();

        assert_eq!(second.get("user").await.unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_handles_share_state() {
        let store = MemorySessionStore::new();
        store.session("s").set("k", json!(true)).await.unwrap();

        assert_eq!(store.session("s").get("k").await.unwrap(), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_del_missing_key_is_noop() {
        let store = MemorySessionStore::new();
        let session = store.session("s");
        session.set("keep", json!(1)).await.unwrap();

        session.del("missing").await.unwrap();
        session.del("missing").await.unwrap();

        assert_eq!(session.get("keep").await.unwrap(), Some(json!(1)));
    }
}
