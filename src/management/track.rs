use std::path::PathBuf;

use crate::{error::CacheError, types::TrackSnapshot};

pub struct TrackCacheManager {
    path: PathBuf,
}

impl TrackCacheManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("foliosrv/cache/track.json");
        path
    }

    // Errors are reported as-is; deciding whether a failed read means
    // "absent" is the caller's call.
    pub async fn read(&self) -> Result<TrackSnapshot, CacheError> {
        let content = async_fs::read_to_string(&self.path).await?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    pub async fn write(&self, snapshot: &TrackSnapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}
