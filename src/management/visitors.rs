use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{SecondsFormat, Utc};
use reqwest::Client;

use crate::{
    error::{CacheError, UpstreamError},
    types::{KvCredentials, KvReadResponse, VisitorCount},
    warning,
};

const KV_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct KvStore {
    credentials: KvCredentials,
    base_url: String,
}

impl KvStore {
    pub fn new(credentials: KvCredentials, base_url: String) -> Self {
        Self {
            credentials,
            base_url,
        }
    }

    pub async fn read(&self) -> Result<VisitorCount, UpstreamError> {
        let client = Client::new();
        let res = client
            .get(format!(
                "{}/b/{}/latest",
                self.base_url, self.credentials.bin_id
            ))
            .header("X-Master-Key", &self.credentials.api_key)
            .timeout(KV_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(UpstreamError::Transport(format!(
                "remote store returned {}",
                res.status()
            )));
        }

        let body: KvReadResponse = res.json().await?;
        Ok(body.record)
    }

    pub async fn write(&self, record: &VisitorCount) -> Result<(), UpstreamError> {
        let client = Client::new();
        let res = client
            .put(format!("{}/b/{}", self.base_url, self.credentials.bin_id))
            .header("X-Master-Key", &self.credentials.api_key)
            .json(record)
            .timeout(KV_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(UpstreamError::Transport(format!(
                "remote store returned {}",
                res.status()
            )));
        }

        Ok(())
    }
}

enum VisitorStore {
    Remote(KvStore),
    File(PathBuf),
}

pub struct VisitorManager {
    store: VisitorStore,
}

impl VisitorManager {
    pub fn remote(store: KvStore) -> Self {
        Self {
            store: VisitorStore::Remote(store),
        }
    }

    pub fn file(path: PathBuf) -> Self {
        Self {
            store: VisitorStore::File(path),
        }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("foliosrv/cache/visitors.json");
        path
    }

    pub async fn current(&self) -> Result<VisitorCount, UpstreamError> {
        match &self.store {
            VisitorStore::Remote(kv) => kv.read().await,
            VisitorStore::File(path) => Ok(read_file_count(path).await),
        }
    }

    pub async fn increment(&self) -> Result<VisitorCount, UpstreamError> {
        match &self.store {
            VisitorStore::Remote(kv) => {
                let mut data = kv.read().await?;
                data.count += 1;
                data.last_updated = timestamp_now();
                kv.write(&data).await?;
                Ok(data)
            }
            VisitorStore::File(path) => {
                let mut data = read_file_count(path).await;
                data.count += 1;
                data.last_updated = timestamp_now();
                // Writes are best effort like reads: the bumped count is
                // served even when the persist fails.
                if let Err(e) = write_file_count(path, &data).await {
                    warning!("Visitor counter persist failed: {}", e);
                }
                Ok(data)
            }
        }
    }
}

fn fresh_count() -> VisitorCount {
    VisitorCount {
        count: 0,
        last_updated: timestamp_now(),
    }
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// File reads are best effort: a missing or corrupt counter restarts at zero.
async fn read_file_count(path: &Path) -> VisitorCount {
    match load_file_count(path).await {
        Ok(data) => data,
        Err(CacheError::Io(e)) if e.kind() == ErrorKind::NotFound => fresh_count(),
        Err(e) => {
            warning!("Resetting unreadable visitor counter: {}", e);
            fresh_count()
        }
    }
}

async fn load_file_count(path: &Path) -> Result<VisitorCount, CacheError> {
    let content = async_fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

async fn write_file_count(path: &Path, data: &VisitorCount) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;
    async_fs::write(path, json).await?;
    Ok(())
}
