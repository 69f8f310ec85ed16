//! Sync agent: reconciles the offline buffer with the remote store when
//! connectivity returns.
//!
//! One attempt per reconnect edge, no internal retry or backoff; the next
//! trigger is the next reconnect. A single-flight guard ensures a flapping
//! connection cannot issue a duplicate create for the same buffered paste.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{broadcast, Mutex};

use crate::{
    generate_slug, OfflineBuffer, RemoteStore, Result, Session, SyncEvent, SyncOutcome,
};

/// Capacity of the sync event channel; observers that lag simply miss
/// old notifications.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Drains the offline buffer into the remote store on reconnect.
pub struct SyncAgent {
    /// Remote document store
    remote: Arc<dyn RemoteStore>,

    /// Single-slot offline buffer
    buffer: OfflineBuffer,

    /// Single-flight guard: held for the duration of one sync attempt
    in_flight: Mutex<()>,

    /// Channel notifying observers of sync completion
    events: broadcast::Sender<SyncEvent>,
}

impl SyncAgent {
    pub fn new(remote: Arc<dyn RemoteStore>, buffer: OfflineBuffer) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            remote,
            buffer,
            in_flight: Mutex::new(()),
            events,
        }
    }

    /// Subscribes to sync completion events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Attempts to flush the buffered paste to the remote store.
    ///
    /// Fails fast when the buffer is empty or no session is available.
    /// On success the slot is cleared (unless a newer save replaced it
    /// mid-flight) and `SyncEvent::Succeeded` is broadcast. On failure
    /// the buffer is left intact for the next reconnect and
    /// `SyncEvent::Failed` is broadcast before the error is returned.
    pub async fn sync(&self, session: Option<&Session>) -> Result<SyncOutcome> {
        // At most one attempt in flight per reconnect burst.
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Sync already in flight; skipping duplicate attempt");
            return Ok(SyncOutcome::AlreadyInFlight);
        };

        let Some(mut paste) = self.buffer.load()? else {
            debug!("Offline buffer empty; nothing to sync");
            return Ok(SyncOutcome::NothingPending);
        };

        let Some(session) = session else {
            debug!("No session available; keeping buffered paste");
            return Ok(SyncOutcome::NoSession);
        };

        // Snapshot of the slot we are about to flush, for compare-and-clear.
        let buffered = paste.clone();

        // Buffers written by older clients may lack a slug; assign the
        // one-and-only slug now.
        if paste.slug.is_none() {
            paste.slug = Some(generate_slug());
        }
        paste.user_id = Some(session.uid.clone());

        info!(
            "Syncing buffered paste '{}' for user {}",
            paste.title, session.uid
        );

        match self.remote.create_paste(&paste).await {
            Ok(id) => {
                if !self.buffer.clear_matching(&buffered)? {
                    warn!("Buffer changed during sync; newer entry kept for next reconnect");
                }
                let slug = paste.slug.clone().unwrap_or_default();
                let _ = self.events.send(SyncEvent::Succeeded { slug: slug.clone() });
                info!("Offline paste synced as document {}", id);
                Ok(SyncOutcome::Synced { id, slug })
            }
            Err(e) => {
                warn!("Failed to sync offline paste: {}", e);
                let _ = self.events.send(SyncEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
