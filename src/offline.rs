//! Offline buffer: a durable single-slot staging area for one paste
//! created or edited while disconnected.
//!
//! The buffer is an explicit object over an injected key-value store so
//! it can be unit-tested against an in-memory fake and backed by a real
//! file on disk in the binary. At most one pending paste exists at any
//! time; a second offline save silently discards the first.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::{NotopiaError, Paste, Result};

/// Storage key for the single buffered paste.
pub const UNSYNCED_PASTE_KEY: &str = "unsynced_paste";

/// Local persistent key-value storage, the buffer's backing store.
/// Mirrors the platform storage contract: get/set/remove on string
/// payloads, synchronous from the caller's perspective.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory key-value store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| NotopiaError::LockAcquisitionFailed {
                message: "Failed to acquire lock on key-value entries".to_string(),
            })
    }
}

impl KeyValueStore for MemoryKeyValueStore {
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
}

/// File-backed key-value store: one file per key under a directory,
/// written atomically so a crash mid-write never corrupts the slot.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&path).map_err(|e| NotopiaError::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Durable single-slot staging area for one unsynced paste.
#[derive(Clone)]
pub struct OfflineBuffer {
    store: Arc<dyn KeyValueStore>,
}

impl OfflineBuffer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Serializes `paste` into the slot, overwriting any existing entry.
    /// The previous entry, if any, is unrecoverable after this call.
    pub fn save(&self, paste: &Paste) -> Result<()> {
        if self.store.get(UNSYNCED_PASTE_KEY)?.is_some() {
            warn!("Offline buffer already holds a pending paste; replacing it");
        }
        let payload = serde_json::to_string(paste)?;
        self.store.set(UNSYNCED_PASTE_KEY, &payload)?;
        debug!("Buffered unsynced paste: {}", paste.title);
        Ok(())
    }

    /// Returns the buffered paste, or `None` when the slot is empty.
    pub fn load(&self) -> Result<Option<Paste>> {
        match self.store.get(UNSYNCED_PASTE_KEY)? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Removes the buffered entry. Clearing an empty buffer is not an
    /// error.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(UNSYNCED_PASTE_KEY)
    }

    /// Removes the slot only if it still holds `paste`. Returns whether
    /// the slot was cleared. A save that landed after `paste` was read
    /// survives, so it can sync on the next reconnect.
    pub fn clear_matching(&self, paste: &Paste) -> Result<bool> {
        match self.store.get(UNSYNCED_PASTE_KEY)? {
            Some(payload) => {
                let current: Paste = serde_json::from_str(&payload)?;
                if &current == paste {
                    self.store.remove(UNSYNCED_PASTE_KEY)?;
                    Ok(true)
                } else {
                    debug!("Offline buffer changed mid-sync; keeping newer entry");
                    Ok(false)
                }
            }
            None => Ok(false),
        }
    }

    /// Whether a paste is currently pending.
    pub fn is_pending(&self) -> Result<bool> {
        Ok(self.store.get(UNSYNCED_PASTE_KEY)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> OfflineBuffer {
        OfflineBuffer::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[test]
    fn load_on_empty_buffer_returns_none() {
        let buf = buffer();
        assert!(buf.load().unwrap().is_none());
        assert!(!buf.is_pending().unwrap());
    }

    #[test]
    fn second_save_overwrites_first() {
        let buf = buffer();
        let a = Paste::new("a".into(), "first".into(), vec![]);
        let b = Paste::new("b".into(), "second".into(), vec![]);

        buf.save(&a).unwrap();
        buf.save(&b).unwrap();

        let loaded = buf.load().unwrap().unwrap();
        assert_eq!(loaded.title, "b");
        assert_eq!(loaded.content, "second");
    }

    #[test]
    fn clear_is_idempotent() {
        let buf = buffer();
        buf.clear().unwrap();
        let paste = Paste::new("t".into(), "c".into(), vec![]);
        buf.save(&paste).unwrap();
        buf.clear().unwrap();
        buf.clear().unwrap();
        assert!(buf.load().unwrap().is_none());
    }

    #[test]
    fn clear_matching_keeps_newer_entry() {
        let buf = buffer();
        let old = Paste::new("old".into(), "c".into(), vec![]);
        let new = Paste::new("new".into(), "c".into(), vec![]);

        buf.save(&old).unwrap();
        // A save lands between the sync agent's load and its clear.
        buf.save(&new).unwrap();

        assert!(!buf.clear_matching(&old).unwrap());
        assert_eq!(buf.load().unwrap().unwrap().title, "new");

        assert!(buf.clear_matching(&new).unwrap());
        assert!(buf.load().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let paste = Paste::new("t".into(), "c".into(), vec!["x".into()]);

        {
            let store = FileKeyValueStore::new(dir.path().to_path_buf()).unwrap();
            let buf = OfflineBuffer::new(Arc::new(store));
            buf.save(&paste).unwrap();
        }

        let store = FileKeyValueStore::new(dir.path().to_path_buf()).unwrap();
        let buf = OfflineBuffer::new(Arc::new(store));
        assert_eq!(buf.load().unwrap().unwrap(), paste);
    }
}
