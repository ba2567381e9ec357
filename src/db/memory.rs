use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{UserId, UserSnapshot},
};

use super::SnapshotStore;

/// Keeps serialized snapshots in process memory
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<UserId, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, snapshot: &UserSnapshot) -> AppResult<()> {
        let json = serde_json::to_string(snapshot)?;
        self.snapshots.write().await.insert(snapshot.user_id, json);
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> AppResult<UserSnapshot> {
        let snapshots = self.snapshots.read().await;
        let json = snapshots
            .get(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("no saved data for user {}", user_id)))?;
        Ok(serde_json::from_str(json)?)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
