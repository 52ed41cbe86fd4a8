//! Refresh token registry: the server-side record of which refresh tokens are
//! still live and who owns them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::RefreshTokenEntry;

/// Injectable store of live refresh tokens.
///
/// Each call is atomic on its own; callers never need to hold a lock across
/// calls. Expiry is enforced by token verification, `expires_at` only lets a
/// backend drop residue.
#[async_trait]
pub trait RefreshTokenRegistry: Send + Sync {
    async fn put(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), anyhow::Error>;

    async fn get(&self, token: &str) -> Result<Option<i64>, anyhow::Error>;

    /// Removing an absent token is not an error.
    async fn delete(&self, token: &str) -> Result<(), anyhow::Error>;

    /// Drop entries whose expiry has passed; returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, anyhow::Error>;

    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

/// Process-local registry. Lost on restart, which logs every session out.
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: DashMap<String, RefreshTokenEntry>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RefreshTokenRegistry for InMemoryRegistry {
    async fn put(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), anyhow::Error> {
        self.entries.insert(
            RefreshTokenEntry::hash_token(token),
            RefreshTokenEntry::new(user_id, expires_at),
        );
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<i64>, anyhow::Error> {
        Ok(self
            .entries
            .get(&RefreshTokenEntry::hash_token(token))
            .map(|entry| entry.user_id))
    }

    async fn delete(&self, token: &str) -> Result<(), anyhow::Error> {
        self.entries.remove(&RefreshTokenEntry::hash_token(token));
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, anyhow::Error> {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

/// Periodically purge expired entries so stale tokens do not accumulate.
pub fn spawn_registry_sweeper(
    registry: Arc<dyn RefreshTokenRegistry>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match registry.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Purged expired refresh tokens"),
                Err(e) => tracing::warn!(error = %e, "Refresh token sweep failed"),
            }
        }
    })
}
