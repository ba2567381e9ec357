use std::sync::Arc;

use crate::{
    config::{Config, StoreBackend},
    error::AppResult,
    models::{UserId, UserSnapshot},
};

pub mod fs;
pub mod memory;
pub mod redis;

pub use fs::FsSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use self::redis::{create_redis_client, RedisSnapshotStore, SnapshotKey};

/// Durable home for per-user snapshots.
///
/// A `save` replaces the user's previous snapshot as a whole; a `load` never
/// observes a half-written one. Snapshots of different users are independent.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Writes the snapshot, replacing any previous one for the same user
    async fn save(&self, snapshot: &UserSnapshot) -> AppResult<()>;

    /// Reads a user's snapshot, failing with `NotFound` when none exists
    async fn load(&self, user_id: UserId) -> AppResult<UserSnapshot>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Builds the snapshot store selected by configuration
pub async fn create_store(config: &Config) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    let store: Arc<dyn SnapshotStore> = match config.store_backend {
        StoreBackend::Fs => Arc::new(FsSnapshotStore::new(&config.snapshot_dir).await?),
        StoreBackend::Redis => {
            Arc::new(RedisSnapshotStore::new(create_redis_client(&config.redis_url)?))
        }
        StoreBackend::Memory => Arc::new(MemorySnapshotStore::new()),
    };

    tracing::info!(backend = store.name(), "Snapshot store ready");
    Ok(store)
}
