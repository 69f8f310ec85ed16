//! High-level client operations over the remote store, the offline
//! buffer, the connectivity monitor and the sync agent.
//!
//! This is the surface a front-end drives: paste and folder CRUD,
//! pinning, filtering and fuzzy search, public slug views, and the
//! auto-sync wiring that flushes the offline buffer on reconnect.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::{debug, info, warn};

use crate::{
    generate_slug, ConnectivityMonitor, ConnectivityWatch, Folder, KeyValueStore, NewPaste,
    NotopiaError, OfflineBuffer, Paste, PasteFilter, PasteUpdate, RemoteStore, Result, Session,
    SortOrder, SyncAgent, SyncOutcome,
};

/// Client facade tying the subsystem together.
pub struct NotopiaClient {
    /// Remote document store
    remote: Arc<dyn RemoteStore>,

    /// Single-slot offline buffer
    buffer: OfflineBuffer,

    /// Connectivity monitor driving reconnect syncs
    monitor: Arc<ConnectivityMonitor>,

    /// Sync agent draining the buffer on reconnect
    agent: Arc<SyncAgent>,

    /// Current identity session, if signed in
    session: Arc<Mutex<Option<Session>>>,
}

impl NotopiaClient {
    /// Creates a client over the given remote store and local key-value
    /// storage. `initial_online` is the sampled platform state.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn KeyValueStore>,
        initial_online: bool,
    ) -> Self {
        let buffer = OfflineBuffer::new(local);
        let agent = Arc::new(SyncAgent::new(Arc::clone(&remote), buffer.clone()));
        Self {
            remote,
            buffer,
            monitor: Arc::new(ConnectivityMonitor::new(initial_online)),
            agent,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// The connectivity monitor, for the platform adapter to feed.
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// The sync agent, for observing sync events.
    pub fn sync_agent(&self) -> Arc<SyncAgent> {
        Arc::clone(&self.agent)
    }

    /// The offline buffer, for status inspection.
    pub fn offline_buffer(&self) -> &OfflineBuffer {
        &self.buffer
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Installs the identity provider's current session, or clears it.
    pub fn set_session(&self, session: Option<Session>) {
        if let Ok(mut slot) = self.session.lock() {
            *slot = session;
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn require_session(&self) -> Result<Session> {
        self.current_session().ok_or(NotopiaError::NotSignedIn)
    }

    /// Fetches a paste and verifies the current session owns it. The
    /// rejection carries the document ID only.
    async fn authorize_paste(&self, id: &str) -> Result<(Paste, Session)> {
        let session = self.require_session()?;
        let paste = self
            .remote
            .get_paste(id)
            .await?
            .ok_or_else(|| NotopiaError::PasteNotFound { id: id.to_string() })?;

        if paste.user_id.as_deref() != Some(session.uid.as_str()) {
            return Err(NotopiaError::Unauthorized { id: id.to_string() });
        }
        Ok((paste, session))
    }

    /// Fetches a paste the current session owns, for editing.
    pub async fn get_paste(&self, id: &str) -> Result<Paste> {
        let (paste, _session) = self.authorize_paste(id).await?;
        Ok(paste)
    }

    /// Creates a paste. Online, the document goes straight to the remote
    /// store stamped with the session's uid. Offline, it is staged in the
    /// single-slot buffer (silently replacing any earlier unsynced paste)
    /// and synced on the next reconnect. The slug is assigned here, once,
    /// on either path.
    pub async fn create_paste(&self, new: NewPaste) -> Result<Paste> {
        if new.title.trim().is_empty() || new.content.trim().is_empty() {
            return Err(NotopiaError::InvalidPaste {
                message: "title and content must be non-empty".to_string(),
            });
        }

        let mut paste = Paste::new(new.title, new.content, new.tags);
        paste.folder_id = new.folder_id;
        paste.slug = Some(generate_slug());

        if self.is_online() {
            let session = self.require_session()?;
            paste.user_id = Some(session.uid);
            let id = self.remote.create_paste(&paste).await?;
            paste.id = Some(id.clone());
            info!("Created paste {} (slug {:?})", id, paste.slug);
        } else {
            self.buffer.save(&paste)?;
            info!("Offline: buffered paste '{}' for later sync", paste.title);
        }

        Ok(paste)
    }

    /// Applies a partial update to an owned paste. The slug is never
    /// touched; `updated_at` is refreshed.
    pub async fn update_paste(&self, id: &str, update: PasteUpdate) -> Result<Paste> {
        let (mut paste, _session) = self.authorize_paste(id).await?;

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(NotopiaError::InvalidPaste {
                    message: "title must be non-empty".to_string(),
                });
            }
            paste.title = title;
        }
        if let Some(content) = update.content {
            if content.trim().is_empty() {
                return Err(NotopiaError::InvalidPaste {
                    message: "content must be non-empty".to_string(),
                });
            }
            paste.content = content;
        }
        if let Some(tags) = update.tags {
            paste.tags = tags;
        }
        if let Some(folder_id) = update.folder_id {
            paste.folder_id = folder_id;
        }
        paste.updated_at = Utc::now();

        self.remote.update_paste(id, &paste).await?;
        debug!("Updated paste {}", id);
        Ok(paste)
    }

    /// Toggles the pinned flag, returning the new value.
    pub async fn toggle_pin(&self, id: &str) -> Result<bool> {
        let (mut paste, _session) = self.authorize_paste(id).await?;
        paste.is_pinned = !paste.is_pinned;
        paste.updated_at = Utc::now();
        self.remote.update_paste(id, &paste).await?;
        Ok(paste.is_pinned)
    }

    /// Deletes an owned paste.
    pub async fn delete_paste(&self, id: &str) -> Result<()> {
        self.authorize_paste(id).await?;
        self.remote.delete_paste(id).await?;
        info!("Deleted paste {}", id);
        Ok(())
    }

    /// Lists the session's pastes with folder/tag/substring filters,
    /// pinned first, then by creation date.
    pub async fn list_pastes(&self, filter: &PasteFilter) -> Result<Vec<Paste>> {
        let session = self.require_session()?;
        let pastes = self.remote.pastes_by_user(&session.uid).await?;
        Ok(filter_and_sort(pastes, filter))
    }

    /// Fuzzy search over the session's pastes, title weighted double.
    pub async fn search_pastes(&self, query: &str, limit: usize) -> Result<Vec<Paste>> {
        let session = self.require_session()?;
        let pastes = self.remote.pastes_by_user(&session.uid).await?;
        let mut ranked = rank_pastes(pastes, query);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Public read-only lookup backing `{origin}/pastes/{slug}`. A
    /// missing slug is a distinct not-found state, not an error to retry.
    pub async fn view_by_slug(&self, slug: &str) -> Result<Paste> {
        self.remote
            .find_paste_by_slug(slug)
            .await?
            .ok_or_else(|| NotopiaError::PasteNotFound {
                id: slug.to_string(),
            })
    }

    /// Creates a folder owned by the current session.
    pub async fn create_folder(&self, name: &str) -> Result<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NotopiaError::InvalidFolder {
                message: "folder name cannot be empty".to_string(),
            });
        }
        let session = self.require_session()?;
        let mut folder = Folder::new(name.to_string(), session.uid);
        let id = self.remote.create_folder(&folder).await?;
        folder.id = Some(id);
        Ok(folder)
    }

    /// The session's folders, newest first.
    pub async fn list_folders(&self) -> Result<Vec<Folder>> {
        let session = self.require_session()?;
        let mut folders = self.remote.folders_by_user(&session.uid).await?;
        folders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(folders)
    }

    pub async fn rename_folder(&self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NotopiaError::InvalidFolder {
                message: "folder name cannot be empty".to_string(),
            });
        }
        self.remote.rename_folder(id, name).await
    }

    /// Removes a folder document. Pastes filed under it are not touched;
    /// their `folder_id` is left dangling.
    pub async fn delete_folder(&self, id: &str) -> Result<()> {
        self.remote.delete_folder(id).await
    }

    /// Runs one sync attempt against the offline buffer.
    pub async fn sync_now(&self) -> Result<SyncOutcome> {
        let session = self.current_session();
        self.agent.sync(session.as_ref()).await
    }

    /// Wires the connectivity monitor to the sync agent: every
    /// offline-to-online edge spawns one sync attempt. Dropping the
    /// returned watch tears the wiring down.
    pub fn spawn_auto_sync(&self) -> ConnectivityWatch {
        let agent = Arc::clone(&self.agent);
        let session = Arc::clone(&self.session);

        self.monitor.subscribe(move |online| {
            if !online {
                return;
            }
            let agent = Arc::clone(&agent);
            let session = session.lock().ok().and_then(|s| s.clone());
            tokio::spawn(async move {
                match agent.sync(session.as_ref()).await {
                    Ok(outcome) => debug!("Reconnect sync finished: {:?}", outcome),
                    Err(e) => warn!("Reconnect sync failed: {}", e),
                }
            });
        })
    }
}

/// Applies folder/tag/substring filters, then orders pinned pastes first
/// and the rest by creation date.
pub fn filter_and_sort(pastes: Vec<Paste>, filter: &PasteFilter) -> Vec<Paste> {
    let query = filter.query.as_ref().map(|q| q.to_lowercase());

    let mut matched: Vec<Paste> = pastes
        .into_iter()
        .filter(|p| match &filter.folder_id {
            Some(folder_id) => p.folder_id.as_deref() == Some(folder_id.as_str()),
            None => true,
        })
        .filter(|p| {
            filter.tags.is_empty() || p.tags.iter().any(|t| filter.tags.contains(t))
        })
        .filter(|p| match &query {
            Some(q) => {
                p.title.to_lowercase().contains(q) || p.content.to_lowercase().contains(q)
            }
            None => true,
        })
        .collect();

    matched.sort_by(|a, b| {
        b.is_pinned.cmp(&a.is_pinned).then_with(|| match filter.sort {
            SortOrder::Newest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
        })
    });

    matched
}

/// Ranks pastes against `query` with fuzzy matching. Title matches are
/// weighted twice as heavily as content matches; non-matching pastes are
/// dropped.
pub fn rank_pastes(pastes: Vec<Paste>, query: &str) -> Vec<Paste> {
    let matcher = SkimMatcherV2::default();

    let mut scored: Vec<(i64, Paste)> = pastes
        .into_iter()
        .filter_map(|paste| {
            let title_score = matcher.fuzzy_match(&paste.title, query).unwrap_or(0);
            let content_score = matcher.fuzzy_match(&paste.content, query).unwrap_or(0);
            let score = title_score * 2 + content_score;
            (score > 0).then_some((score, paste))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, paste)| paste).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn paste(title: &str, content: &str, age_mins: i64) -> Paste {
        let mut p = Paste::new(title.to_string(), content.to_string(), vec![]);
        p.created_at = Utc::now() - Duration::minutes(age_mins);
        p
    }

    #[test]
    fn pinned_pastes_sort_first_then_newest() {
        let mut old_pinned = paste("old", "x", 60);
        old_pinned.is_pinned = true;
        let newer = paste("newer", "x", 10);
        let newest = paste("newest", "x", 1);

        let sorted = filter_and_sort(
            vec![newer, old_pinned, newest],
            &PasteFilter::default(),
        );
        let titles: Vec<&str> = sorted.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["old", "newest", "newer"]);
    }

    #[test]
    fn folder_filter_matches_exactly() {
        let mut filed = paste("filed", "x", 1);
        filed.folder_id = Some("f1".to_string());
        let loose = paste("loose", "x", 2);

        let filter = PasteFilter {
            folder_id: Some("f1".to_string()),
            ..Default::default()
        };
        let sorted = filter_and_sort(vec![filed, loose], &filter);
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].title, "filed");
    }

    #[test]
    fn dangling_folder_filter_yields_empty_not_error() {
        let loose = paste("loose", "x", 1);
        let filter = PasteFilter {
            folder_id: Some("gone".to_string()),
            ..Default::default()
        };
        assert!(filter_and_sort(vec![loose], &filter).is_empty());
    }

    #[test]
    fn query_filter_is_case_insensitive_over_title_and_content() {
        let a = paste("Groceries", "milk and eggs", 1);
        let b = paste("Workout", "leg day", 2);

        let filter = PasteFilter {
            query: Some("MILK".to_string()),
            ..Default::default()
        };
        let hits = filter_and_sort(vec![a, b], &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Groceries");
    }

    #[test]
    fn rank_prefers_title_matches() {
        let title_hit = paste("rust patterns", "nothing relevant", 1);
        let content_hit = paste("misc", "some rust snippets inside", 1);

        let ranked = rank_pastes(vec![content_hit, title_hit], "rust");
        assert_eq!(ranked[0].title, "rust patterns");
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn rank_drops_non_matches() {
        let miss = paste("shopping", "eggs", 1);
        assert!(rank_pastes(vec![miss], "kubernetes").is_empty());
    }
}
