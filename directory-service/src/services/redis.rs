use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, Client};

use crate::models::RefreshTokenEntry;
use crate::services::RefreshTokenRegistry;

const KEY_PREFIX: &str = "refresh:";

/// Refresh token registry shared by every instance through Redis.
///
/// Entries are written with `EX`, so Redis drops them at token expiry and
/// there is nothing left for the sweeper to do.
#[derive(Clone)]
pub struct RedisRegistry {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisRegistry {
    pub async fn new(config: &crate::config::RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!("Connecting to Redis");
        let client = Client::open(config.url.clone())?;

        // Use ConnectionManager for automatic reconnection
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, RefreshTokenEntry::hash_token(token))
    }
}

#[async_trait]
impl RefreshTokenRegistry for RedisRegistry {
    async fn put(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), anyhow::Error> {
        let ttl = (expires_at - Utc::now()).num_seconds();
        if ttl <= 0 {
            // Already dead; storing it would only create residue
            return Ok(());
        }

        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(Self::key(token))
            .arg(user_id)
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to register refresh token: {}", e))
    }

    async fn get(&self, token: &str) -> Result<Option<i64>, anyhow::Error> {
        let mut conn = self.manager.clone();
        let user_id: Option<i64> = redis::cmd("GET")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to look up refresh token: {}", e))?;

        Ok(user_id)
    }

    async fn delete(&self, token: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        let _removed: i64 = redis::cmd("DEL")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to revoke refresh token: {}", e))?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, anyhow::Error> {
        Ok(0)
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}
