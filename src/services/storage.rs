//! Key-value storage for transaction lists
//!
//! Each key holds one JSON document. `FileStorage` keeps one file per key
//! under `~/.gofinances/storage/`; `MemoryStorage` keeps everything in a map.

use directories::BaseDirs;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::{GoFinancesError, Result};

/// Storage key for a user's transaction list
pub fn transactions_key(user_id: &str) -> String {
    format!("@gofinances:transactions_user:{}", user_id)
}

/// Key-value store holding JSON documents
pub trait StorageProvider: Send + Sync {
    /// Stored value for `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Replace the value for `key` with `apply(current)`. Concurrent updates
    /// of one key are serialized, so none of them is lost.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()>;
}

/// File-per-key storage with shared/exclusive locking
pub struct FileStorage {
    storage_dir: PathBuf,
}

impl FileStorage {
    /// Storage under `~/.gofinances/storage`
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| GoFinancesError::Storage("Cannot determine home directory".into()))?;
        Self::open(base_dirs.home_dir().join(".gofinances").join("storage"))
    }

    /// Storage under a custom directory, created if missing
    pub fn open(storage_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn key_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.storage_dir.join(format!("{}.json", file_name))
    }

    /// Sidecar file locked for the whole of an `update`. It outlives
    /// `remove` so that waiting writers keep contending on the same inode.
    fn update_lock_path(&self, key: &str) -> PathBuf {
        self.key_path(key).with_extension("lock")
    }
}

impl StorageProvider for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()
            .map_err(|e| GoFinancesError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();
        read?;

        Ok(Some(content))
    }

    /// Atomic write (temp file + rename) under an exclusive lock
    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.storage_dir)?;

        let path = self.key_path(key);
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path).map_err(|e| {
                GoFinancesError::Storage(format!("Failed to create temp file: {}", e))
            })?;
            file.write_all(value.as_bytes()).map_err(|e| {
                GoFinancesError::Storage(format!("Failed to write temp file: {}", e))
            })?;
            file.sync_all().map_err(|e| {
                GoFinancesError::Storage(format!("Failed to sync temp file: {}", e))
            })?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target
            .lock_exclusive()
            .map_err(|e| GoFinancesError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| GoFinancesError::Storage(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read-modify-write under an exclusive lock on the key's sidecar file
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()> {
        fs::create_dir_all(&self.storage_dir)?;

        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.update_lock_path(key))?;

        lock.lock_exclusive().map_err(|e| {
            GoFinancesError::Storage(format!("Failed to acquire update lock: {}", e))
        })?;

        let result = self
            .get(key)
            .and_then(&mut *apply)
            .and_then(|next| self.set(key, &next));

        let _ = lock.unlock();
        result
    }
}

/// In-memory storage
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| GoFinancesError::Storage("memory storage lock poisoned".into()))
    }
}

impl StorageProvider for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()> {
        let mut values = self.lock()?;
        let next = apply(values.get(key).cloned())?;
        values.insert(key.to_string(), next);
        Ok(())
    }
}
