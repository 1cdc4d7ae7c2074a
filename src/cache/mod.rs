//! Session cache collaborator
//!
//! Key-value store with TTL support holding the revocation marker for the
//! currently valid refresh token, keyed by username. At most one live entry
//! per username; a new signin silently replaces the prior one.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Result;

/// Revocation marker for a username's refresh token. Holds a one-way
/// digest, never the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub refresh_token_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Store an entry under `key`, replacing any prior entry. The entry
    /// expires after `ttl`.
    async fn set(&self, key: &str, entry: SessionEntry, ttl: Duration) -> Result<()>;

    /// Fetch a live entry, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<SessionEntry>>;

    /// Remove an entry. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory session cache. Expiry is passive: reads skip dead entries and
/// a background sweep reclaims them.
pub struct MemorySessionCache {
    entries: RwLock<HashMap<String, (SessionEntry, DateTime<Utc>)>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Start the hourly expiry sweep.
    pub fn start_cleanup_task(self: Arc<Self>) {
        let cache = Arc::clone(&self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                let removed = cache.cleanup_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "swept expired session entries");
                }
            }
        });
    }

    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        before - entries.len()
    }
}

impl Default for MemorySessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn set(&self, key: &str, entry: SessionEntry, ttl: Duration) -> Result<()> {
        let expires_at = Utc::now() + ttl;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (entry, expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<SessionEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|(entry, expires_at)| {
            if *expires_at > Utc::now() {
                Some(entry.clone())
            } else {
                None
            }
        }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str) -> SessionEntry {
        SessionEntry {
            refresh_token_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemorySessionCache::new();
        cache
            .set("alice", entry("h1"), Duration::hours(1))
            .await
            .unwrap();

        let found = cache.get("alice").await.unwrap();
        assert_eq!(found, Some(entry("h1")));
        assert_eq!(cache.get("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_prior_entry() {
        let cache = MemorySessionCache::new();
        cache
            .set("alice", entry("h1"), Duration::hours(1))
            .await
            .unwrap();
        cache
            .set("alice", entry("h2"), Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(cache.get("alice").await.unwrap(), Some(entry("h2")));
    }

    #[tokio::test]
    async fn test_expired_entry_is_dead() {
        let cache = MemorySessionCache::new();
        cache
            .set("alice", entry("h1"), Duration::seconds(-1))
            .await
            .unwrap();

        assert_eq!(cache.get("alice").await.unwrap(), None);

        // The sweep reclaims it
        assert_eq!(cache.cleanup_expired().await, 1);
        assert_eq!(cache.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemorySessionCache::new();
        cache
            .set("alice", entry("h1"), Duration::hours(1))
            .await
            .unwrap();

        cache.delete("alice").await.unwrap();
        assert_eq!(cache.get("alice").await.unwrap(), None);
        // Absent key is not an error
        cache.delete("alice").await.unwrap();
    }
}
