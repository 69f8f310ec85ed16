//! File-backed document store.
//!
//! A local stand-in for the hosted document database: one JSON file per
//! document under `data_dir/{pastes,folders}/`, mirrored in an in-memory
//! cache. Writes go through a temporary file and an atomic rename so a
//! crash never leaves a half-written document behind.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::{Folder, NotopiaError, Paste, RemoteStore, Result};

const PASTES_COLLECTION: &str = "pastes";
const FOLDERS_COLLECTION: &str = "folders";

/// Manages document persistence for the local backend.
pub struct LocalDocumentStore {
    /// Root directory holding one subdirectory per collection
    data_dir: PathBuf,

    /// In-memory cache of paste documents, indexed by document ID
    pastes: Arc<Mutex<HashMap<String, Paste>>>,

    /// In-memory cache of folder documents, indexed by document ID
    folders: Arc<Mutex<HashMap<String, Folder>>>,
}

impl LocalDocumentStore {
    /// Opens (or creates) the store rooted at `data_dir` and loads all
    /// existing documents into the caches.
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        info!(
            "Opening local document store at {}",
            data_dir.display()
        );

        for collection in [PASTES_COLLECTION, FOLDERS_COLLECTION] {
            let dir = data_dir.join(collection);
            if !dir.exists() {
                debug!("Creating collection directory: {}", dir.display());
                fs::create_dir_all(&dir)?;
            }
        }

        let store = Self {
            data_dir,
            pastes: Arc::new(Mutex::new(HashMap::new())),
            folders: Arc::new(Mutex::new(HashMap::new())),
        };
        store.load_documents()?;
        Ok(store)
    }

    /// Loads every document from disk into the caches. Unreadable files
    /// are skipped with a warning so one corrupt document does not take
    /// the store down.
    fn load_documents(&self) -> Result<()> {
        let pastes: HashMap<String, Paste> =
            self.load_collection(PASTES_COLLECTION)?;
        let folders: HashMap<String, Folder> =
            self.load_collection(FOLDERS_COLLECTION)?;

        info!(
            "Loaded {} pastes and {} folders from disk",
            pastes.len(),
            folders.len()
        );

        *self.lock_pastes()? = pastes;
        *self.lock_folders()? = folders;
        Ok(())
    }

    fn load_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<HashMap<String, T>> {
        let dir = self.data_dir.join(collection);
        let mut documents = HashMap::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let id = stem.to_string_lossy().to_string();

            match fs::read_to_string(path)
                .map_err(NotopiaError::Io)
                .and_then(|raw| Ok(serde_json::from_str::<T>(&raw)?))
            {
                Ok(document) => {
                    documents.insert(id, document);
                }
                Err(e) => {
                    warn!(
                        "Skipping unreadable document {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(documents)
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.data_dir.join(collection).join(format!("{}.json", id))
    }

    /// Serializes a document and atomically moves it into place.
    fn write_document<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        document: &T,
    ) -> Result<()> {
        let path = self.document_path(collection, id);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let json = serde_json::to_string_pretty(document)?;
        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(&path)
            .map_err(|e| NotopiaError::Io(e.error))?;

        debug!("Wrote document {}/{}", collection, id);
        Ok(())
    }

    fn remove_document(&self, collection: &str, id: &str) -> Result<()> {
        let path = self.document_path(collection, id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Assigns a document ID from the creation time plus a random suffix.
    fn assign_id(&self) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..0x10000);
        format!("{}-{:04x}", Utc::now().timestamp_millis(), suffix)
    }

    fn lock_pastes(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Paste>>> {
        self.pastes
            .lock()
            .map_err(|_| NotopiaError::LockAcquisitionFailed {
                message: "Failed to acquire lock on paste cache".to_string(),
            })
    }

    fn lock_folders(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Folder>>> {
        self.folders
            .lock()
            .map_err(|_| NotopiaError::LockAcquisitionFailed {
                message: "Failed to acquire lock on folder cache".to_string(),
            })
    }
}

#[async_trait]
impl RemoteStore for LocalDocumentStore {
    async fn create_paste(&self, paste: &Paste) -> Result<String> {
        let id = self.assign_id();
        let mut stored = paste.clone();
        stored.id = Some(id.clone());

        self.write_document(PASTES_COLLECTION, &id, &stored)?;
        self.lock_pastes()?.insert(id.clone(), stored);
        info!("Created paste document: {}", id);
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
        if !self.lock_pastes()?.contains_key(id) {
            return Err(NotopiaError::PasteNotFound { id: id.to_string() });
        }

        let mut stored = paste.clone();
        stored.id = Some(id.to_string());
        self.write_document(PASTES_COLLECTION, id, &stored)?;
        self.lock_pastes()?.insert(id.to_string(), stored);
        debug!("Updated paste document: {}", id);
        Ok(())
    }

    async fn delete_paste(&self, id: &str) -> Result<()> {
        if self.lock_pastes()?.remove(id).is_none() {
            return Err(NotopiaError::PasteNotFound { id: id.to_string() });
        }
        self.remove_document(PASTES_COLLECTION, id)?;
        info!("Deleted paste document: {}", id);
        Ok(())
    }

    async fn create_folder(&self, folder: &Folder) -> Result<String> {
        let id = self.assign_id();
        let mut stored = folder.clone();
        stored.id = Some(id.clone());

        self.write_document(FOLDERS_COLLECTION, &id, &stored)?;
        self.lock_folders()?.insert(id.clone(), stored);
        info!("Created folder document: {}", id);
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
        let updated = {
            let mut folders = self.lock_folders()?;
            let folder = folders
                .get_mut(id)
                .ok_or_else(|| NotopiaError::FolderNotFound { id: id.to_string() })?;
            folder.name = name.to_string();
            folder.clone()
        };
        self.write_document(FOLDERS_COLLECTION, id, &updated)?;
        Ok(())
    }

    async fn delete_folder(&self, id: &str) -> Result<()> {
        // No cascade: pastes referencing this folder keep their folder_id.
        if self.lock_folders()?.remove(id).is_none() {
            return Err(NotopiaError::FolderNotFound { id: id.to_string() });
        }
        self.remove_document(FOLDERS_COLLECTION, id)?;
        info!("Deleted folder document: {}", id);
        Ok(())
    }
}
