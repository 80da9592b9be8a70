use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::collaborators::{CacheInvalidator, TokenStore, TokenStoreError};

/// Process-local token store. Contents do not survive restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl TokenStore for MemoryTokenStore {
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        let mut guard = self.values.lock().expect("token store mutex poisoned");
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let guard = self.values.lock().expect("token store mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn clear(&self, key: &str) -> Result<(), TokenStoreError> {
        let mut guard = self.values.lock().expect("token store mutex poisoned");
        guard.remove(key);
        Ok(())
    }
}

/// Token store backed by a small JSON object on disk.
///
/// Every write rewrites the whole file through a sibling temp file and a rename, so a crash
/// mid-write leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, TokenStoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), keys = values.len(), "token file written");
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock().expect("token file mutex poisoned");
        let mut values = self.read()?;
        values.insert(key.to_owned(), value.to_owned());
        self.write(&values)
    }

    fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let _guard = self.lock.lock().expect("token file mutex poisoned");
        Ok(self.read()?.remove(key))
    }

    fn clear(&self, key: &str) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock().expect("token file mutex poisoned");
        let mut values = self.read()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.write(&values)
    }
}

/// Cache invalidator that remembers every key it was asked to invalidate.
#[derive(Debug, Default, Clone)]
pub struct RecordingCacheInvalidator {
    keys: Arc<Mutex<Vec<String>>>,
}

impl RecordingCacheInvalidator {
    pub fn invalidations(&self) -> Vec<String> {
        self.keys.lock().expect("invalidator mutex poisoned").clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.keys
            .lock()
            .expect("invalidator mutex poisoned")
            .iter()
            .filter(|recorded| recorded.as_str() == key)
            .count()
    }
}

impl CacheInvalidator for RecordingCacheInvalidator {
    fn invalidate(&self, key: &str) {
        debug!(key, "cache key invalidated");
        self.keys
            .lock()
            .expect("invalidator mutex poisoned")
            .push(key.to_owned());
    }
}
