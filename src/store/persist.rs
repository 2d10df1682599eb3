//! Persistence of [`RootState`] to a versioned, keyed blob
//!
//! The blob is JSON: `{"key": "root", "version": 1, "state": {...}}`, stored
//! under the storage key `persist:root`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::oneshot;

use super::RootState;

pub const PERSIST_KEY: &str = "root";
pub const PERSIST_VERSION: u32 = 1;

/// Key/value string storage, one blob per key
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Files under a directory: key `persist:root` lives in `persist-root.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(key);
        // Readers see either the old blob or the new one, never a partial write
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("persisted state has version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("persisted state is under key {found:?}, expected {expected:?}")]
    KeyMismatch { found: String, expected: String },
    #[error("persisted state is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    key: String,
    version: u32,
    state: T,
}

pub struct Persistor {
    key: &'static str,
    version: u32,
    storage: Arc<dyn Storage>,
    paused: AtomicBool,
}

impl Persistor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            key: PERSIST_KEY,
            version: PERSIST_VERSION,
            storage,
            paused: AtomicBool::new(false),
        }
    }

    fn storage_key(&self) -> String {
        format!("persist:{}", self.key)
    }

    /// Where an unusable blob is set aside (`persist-root-bak.json` on disk)
    fn backup_key(&self) -> String {
        format!("persist:{}-bak", self.key)
    }

    /// Decode a stored blob, rejecting foreign keys and other versions
    pub fn decode(&self, blob: &str) -> Result<RootState, PersistError> {
        let envelope: Envelope<RootState> = serde_json::from_str(blob)?;
        if envelope.key != self.key {
            return Err(PersistError::KeyMismatch {
                found: envelope.key,
                expected: self.key.to_string(),
            });
        }
        if envelope.version != self.version {
            return Err(PersistError::VersionMismatch {
                found: envelope.version,
                expected: self.version,
            });
        }
        Ok(envelope.state)
    }

    /// Read persisted state. Unusable blobs are copied to the backup key,
    /// logged and treated as absent, so the next save cannot lose them.
    pub fn load(&self) -> Result<Option<RootState>> {
        let Some(blob) = self.storage.get_item(&self.storage_key())? else {
            tracing::info!("No persisted state under {}", self.storage_key());
            return Ok(None);
        };

        match self.decode(&blob) {
            Ok(state) => {
                tracing::info!(
                    entries = state.journal.entries.len(),
                    "Rehydrated persisted state"
                );
                Ok(Some(state))
            }
            Err(e) => {
                tracing::warn!("Ignoring persisted state: {}", e);
                self.storage
                    .set_item(&self.backup_key(), &blob)
                    .context("Failed to back up unusable persisted state")?;
                tracing::warn!("Unusable state kept under {}", self.backup_key());
                Ok(None)
            }
        }
    }

    /// Write the state. A no-op while paused.
    pub fn save(&self, state: &RootState) -> Result<()> {
        if self.is_paused() {
            tracing::debug!("Persistence paused, skipping save");
            return Ok(());
        }
        let envelope = Envelope {
            key: self.key.to_string(),
            version: self.version,
            state,
        };
        let blob = serde_json::to_string(&envelope).context("Failed to serialize state")?;
        self.storage.set_item(&self.storage_key(), &blob)
    }

    pub fn purge(&self) -> Result<()> {
        tracing::info!("Purging persisted state");
        self.storage.remove_item(&self.storage_key())
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Load on the blocking pool; the result arrives on the returned channel
    pub fn spawn_rehydrate(self: &Arc<Self>) -> oneshot::Receiver<Result<Option<RootState>>> {
        let (tx, rx) = oneshot::channel();
        let persistor = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let result = persistor.load();
            if tx.send(result).is_err() {
                tracing::debug!("Rehydration finished after the app went away");
            }
        });
        rx
    }
}
