use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    error::{AppError, AppResult},
    models::{UserId, UserSnapshot},
};

use super::SnapshotStore;

/// Stores each user's snapshot as `<user_id>.json` in one directory
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    base: PathBuf,
}

impl FsSnapshotStore {
    /// Opens a store rooted at `base`, creating the directory if needed
    pub async fn new(base: impl AsRef<Path>) -> AppResult<Self> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base).await?;
        Ok(Self { base })
    }

    fn path_for(&self, user_id: UserId) -> PathBuf {
        self.base.join(format!("{}.json", user_id))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn save(&self, snapshot: &UserSnapshot) -> AppResult<()> {
        let path = self.path_for(snapshot.user_id);
        let data = serde_json::to_vec_pretty(snapshot)?;

        // Write beside the target and rename over it so readers only ever
        // see a complete file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(user_id = %snapshot.user_id, path = %path.display(), "Saved snapshot");
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> AppResult<UserSnapshot> {
        let path = self.path_for(user_id);
        let data = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("no saved data for user {}", user_id)));
            }
            Err(err) => return Err(AppError::Storage(err)),
        };

        Ok(serde_json::from_slice(&data)?)
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NeighbourRecord, OrderKey, OrderRecord, Rating};
    use chrono::Utc;

    fn snapshot(user_id: u32, cuisine: &str) -> UserSnapshot {
        let key = OrderKey::new("Pizza Place", cuisine).unwrap();
        UserSnapshot {
            user_id: UserId::new(user_id),
            one_time: vec![OrderRecord::new(&key, Rating::NotGiven)],
            repeated: vec![],
            neighbours: vec![NeighbourRecord {
                user_id: UserId::new(2000),
                cuisine: cuisine.to_string(),
            }],
            saved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path()).await.unwrap();

        let saved = snapshot(1000, "Italian");
        store.save(&saved).await.unwrap();

        let loaded = store.load(UserId::new(1000)).await.unwrap();
        assert_eq!(loaded, saved);
        assert!(dir.path().join("1000.json").exists());
        assert!(!dir.path().join("1000.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path()).await.unwrap();

        store.save(&snapshot(1000, "Italian")).await.unwrap();
        let newer = snapshot(1000, "Thai");
        store.save(&newer).await.unwrap();

        let loaded = store.load(UserId::new(1000)).await.unwrap();
        assert_eq!(loaded.neighbours[0].cuisine, "Thai");
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path().join("nested")).await.unwrap();

        let err = store.load(UserId::new(4242)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("1000.json"), b"{not json").unwrap();

        let err = store.load(UserId::new(1000)).await.unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
