use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::{AppError, AppResult};
use crate::models::{UserId, UserSnapshot};

use crate::db::SnapshotStore;

/// Redis key holding one user's snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotKey(pub UserId);

impl Display for SnapshotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "snapshot:{}", self.0)
    }
}

/// Creates a Redis client for snapshot storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Snapshot store backed by Redis, one string key per user.
///
/// A save is a single `SET`, so it replaces the previous snapshot
/// atomically. Snapshots never expire.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    redis_client: Client,
}

impl RedisSnapshotStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn save(&self, snapshot: &UserSnapshot) -> AppResult<()> {
        let key = SnapshotKey(snapshot.user_id);
        let json = serde_json::to_string(snapshot)?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(key.to_string(), json).await.map_err(|e| {
            tracing::warn!(error = %e, key = %key, "Redis set failed");
            e
        })?;

        tracing::debug!(user_id = %snapshot.user_id, "Saved snapshot");
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> AppResult<UserSnapshot> {
        let key = SnapshotKey(user_id);
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(key.to_string()).await?;

        match stored {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(AppError::NotFound(format!(
                "no saved data for user {}",
                user_id
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
