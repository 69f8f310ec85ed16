//! Remote document store seam.
//!
//! The hosted document database is an external collaborator; this trait
//! captures the operations the client consumes from it. Conflict behavior
//! is document-level last-writer-wins. `InMemoryRemote` is an in-process
//! implementation with injectable create failure and latency, used by
//! tests and as a scratch backend.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{Folder, NotopiaError, Paste, Result};

/// Operations consumed from the remote document store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates a paste document and returns its remote-assigned ID.
    async fn create_paste(&self, paste: &Paste) -> Result<String>;

    /// Fetches a paste by document ID.
    async fn get_paste(&self, id: &str) -> Result<Option<Paste>>;

    /// Looks up the paste whose `slug` field equals `slug`.
    async fn find_paste_by_slug(&self, slug: &str) -> Result<Option<Paste>>;

    /// All pastes owned by `user_id`.
    async fn pastes_by_user(&self, user_id: &str) -> Result<Vec<Paste>>;

    /// Replaces the paste document. Last writer wins.
    async fn update_paste(&self, id: &str, paste: &Paste) -> Result<()>;

    /// Deletes a paste document.
    async fn delete_paste(&self, id: &str) -> Result<()>;

    /// Creates a folder document and returns its remote-assigned ID.
    async fn create_folder(&self, folder: &Folder) -> Result<String>;

    /// All folders owned by `user_id`.
    async fn folders_by_user(&self, user_id: &str) -> Result<Vec<Folder>>;

    /// Renames a folder document.
    async fn rename_folder(&self, id: &str, name: &str) -> Result<()>;

    /// Deletes a folder document. Pastes referencing it are left alone;
    /// their `folder_id` dangles.
    async fn delete_folder(&self, id: &str) -> Result<()>;
}

/// In-memory remote store.
///
/// Create calls can be made to fail (`set_fail_creates`) or to stall
/// (`set_create_delay`) so reconnect and single-flight behavior can be
/// exercised deterministically.
#[derive(Default)]
pub struct InMemoryRemote {
    pastes: Mutex<HashMap<String, Paste>>,
    folders: Mutex<HashMap<String, Folder>>,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
    fail_creates: AtomicBool,
    create_delay_ms: AtomicU64,
}

impl InMemoryRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// When set, every `create_paste` call fails with a remote error.
    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Adds artificial latency to `create_paste` calls.
    pub fn set_create_delay(&self, delay: Duration) {
        self.create_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `create_paste` calls issued so far, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of paste documents currently stored.
    pub fn paste_count(&self) -> usize {
        self.pastes.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn assign_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", prefix, n + 1)
    }

    fn lock_pastes(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Paste>>> {
        self.pastes
            .lock()
            .map_err(|_| NotopiaError::LockAcquisitionFailed {
                message: "Failed to acquire lock on pastes".to_string(),
            })
    }

    fn lock_folders(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Folder>>> {
        self.folders
            .lock()
            .map_err(|_| NotopiaError::LockAcquisitionFailed {
                message: "Failed to acquire lock on folders".to_string(),
            })
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn create_paste(&self, paste: &Paste) -> Result<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.create_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(NotopiaError::RemoteStore {
                message: "create rejected by remote".to_string(),
            });
        }

        let id = self.assign_id("paste");
        let mut stored = paste.clone();
        stored.id = Some(id.clone());
        self.lock_pastes()?.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get_paste(&self, id: &str) -> Result<Option<Paste>> {
        Ok(self.lock_pastes()?.get(id).cloned())
    }

    async fn find_paste_by_slug(&self, slug: &str) -> Result<Option<Paste>> {
        Ok(self
            .lock_pastes()?
            .values()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn pastes_by_user(&self, user_id: &str) -> Result<Vec<Paste>> {
        Ok(self
            .lock_pastes()?
            .values()
            .filter(|p| p.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn update_paste(&self, id: &str, paste: &Paste) -> Result<()> {
        let mut pastes = self.lock_pastes()?;
        if !pastes.contains_key(id) {
            return Err(NotopiaError::PasteNotFound { id: id.to_string() });
        }
        let mut stored = paste.clone();
        stored.id = Some(id.to_string());
        pastes.insert(id.to_string(), stored);
        Ok(())
    }

    async fn delete_paste(&self, id: &str) -> Result<()> {
        if self.lock_pastes()?.remove(id).is_none() {
            return Err(NotopiaError::PasteNotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn create_folder(&self, folder: &Folder) -> Result<String> {
        let id = self.assign_id("folder");
        let mut stored = folder.clone();
        stored.id = Some(id.clone());
        self.lock_folders()?.insert(id.clone(), stored);
        Ok(id)
    }

    async fn folders_by_user(&self, user_id: &str) -> Result<Vec<Folder>> {
        Ok(self
            .lock_folders()?
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn rename_folder(&self, id: &str, name: &str) -> Result<()> {
        let mut folders = self.lock_folders()?;
        match folders.get_mut(id) {
            Some(folder) => {
                folder.name = name.to_string();
                Ok(())
            }
            None => Err(NotopiaError::FolderNotFound { id: id.to_string() }),
        }
    }

    async fn delete_folder(&self, id: &str) -> Result<()> {
        if self.lock_folders()?.remove(id).is_none() {
            return Err(NotopiaError::FolderNotFound { id: id.to_string() });
        }
        Ok(())
    }
}
