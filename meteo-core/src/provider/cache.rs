use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

/// Distinguishes concurrent writers within one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk cache of response bodies, one file per request URL.
///
/// Entries are written to a temporary file and renamed into place, so readers
/// never observe a partially written body. Any I/O failure degrades to a miss.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    expire_after: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, expire_after: Duration) -> Self {
        Self {
            dir: dir.into(),
            expire_after,
        }
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        let key = blake3::hash(url.as_bytes());
        self.dir.join(format!("{}.json", key.to_hex()))
    }

    /// A fresh cached body for `url`, if any.
    pub async fn get(&self, url: &str) -> Option<Value> {
        let path = self.entry_path(url);
        let modified = fs::metadata(&path).await.ok()?.modified().ok()?;
        // A modification time in the future counts as brand new.
        let age = modified.elapsed().unwrap_or_default();

        if age >= self.expire_after {
            debug!(path = %path.display(), age_secs = age.as_secs(), "Cache entry expired");
            return None;
        }

        let body = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    pub async fn put(&self, url: &str, body: &str) {
        if let Err(err) = self.try_put(url, body).await {
            warn!(dir = %self.dir.display(), error = %err, "Failed to write cache entry");
        }
    }

    async fn try_put(&self, url: &str, body: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.entry_path(url);
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}-{seq}.tmp", std::process::id()));
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &path).await
    }
}
