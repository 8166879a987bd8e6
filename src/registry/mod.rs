//! The link registry: owns the in-memory record sequence, enforces
//! its invariants, and keeps the persisted blob in sync.
//!
//! Every mutating operation and every read snapshot goes through one
//! registry-wide lock, so caller-thread CRUD and enrichment
//! write-back never race on the sequence. Persistence is best-effort:
//! a failed save is logged and the in-memory state stays
//! authoritative until the next successful write.

pub mod codec;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{SchemeValidator, UrlValidator, VideoLinkRecord};
use crate::enrich::EnrichmentPool;
use crate::store::BlobStore;

/// Storage key the serialized registry lives under.
pub const LINKS_KEY: &str = "network_links";

/// Errors surfaced to callers of mutating operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Orderings for [`LinkRegistry::sorted`]. Ties keep the stored
/// sequence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DateAddedDesc,
    DateAddedAsc,
    TitleAsc,
    TitleDesc,
    MostAccessed,
    LastAccessed,
}

/// State shared between the caller-facing registry and enrichment
/// tasks: the record sequence, its lock, and the persistence wiring.
pub(crate) struct RegistryState {
    links: Mutex<Vec<VideoLinkRecord>>,
    store: Box<dyn BlobStore>,
    validator: Arc<dyn UrlValidator>,
    thumbnails_dir: PathBuf,
}

impl RegistryState {
    fn lock_links(&self) -> MutexGuard<'_, Vec<VideoLinkRecord>> {
        // A poisoned lock means a holder panicked; the sequence itself
        // is still the best state we have.
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serialize and write the sequence. Failures are logged, never
    /// returned: memory stays authoritative and the next successful
    /// persist reconciles storage. Callers hold the links lock, which
    /// also serializes writes to the blob.
    fn persist(&self, links: &[VideoLinkRecord]) {
        let blob = match codec::encode(links) {
            Ok(blob) => blob,
            Err(e) => {
                error!("failed to encode link registry: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.put(LINKS_KEY, &blob) {
            warn!("failed to persist link registry: {}", e);
        }
    }

    /// Replace the stored record with a matching id and persist.
    /// Returns false when the id is no longer present.
    pub(crate) fn update_record(&self, record: VideoLinkRecord) -> bool {
        let mut links = self.lock_links();
        let Some(slot) = links.iter_mut().find(|l| l.id == record.id) else {
            return false;
        };
        *slot = record;
        self.persist(&links);
        true
    }

    /// Where the cached thumbnail for a record lives.
    pub(crate) fn thumbnail_path_for(&self, id: &str) -> PathBuf {
        self.thumbnails_dir.join(format!("thumb_{}.jpg", id))
    }
}

/// Persistent registry of network video links.
///
/// Create it inside a tokio runtime: [`LinkRegistry::add`] spawns
/// enrichment tasks on the ambient runtime.
pub struct LinkRegistry {
    state: Arc<RegistryState>,
    pool: EnrichmentPool,
}

impl LinkRegistry {
    /// Open a registry with the default URL validator and enrichment
    /// strategies.
    pub fn new(store: Box<dyn BlobStore>, thumbnails_dir: PathBuf) -> Self {
        Self::with_options(
            store,
            thumbnails_dir,
            Arc::new(SchemeValidator),
            EnrichmentPool::new(crate::enrich::DEFAULT_WORKERS),
        )
    }

    /// Open a registry with explicit collaborators.
    pub fn with_options(
        store: Box<dyn BlobStore>,
        thumbnails_dir: PathBuf,
        validator: Arc<dyn UrlValidator>,
        pool: EnrichmentPool,
    ) -> Self {
        let links = match store.get(LINKS_KEY) {
            Ok(Some(blob)) => codec::decode(&blob),
            Ok(None) => Vec::new(),
            Err(e) => {
                // Unreadable storage falls back to an empty library.
                warn!("failed to load link registry, starting empty: {}", e);
                Vec::new()
            }
        };
        info!("loaded {} network link(s)", links.len());

        Self {
            state: Arc::new(RegistryState {
                links: Mutex::new(links),
                store,
                validator,
                thumbnails_dir,
            }),
            pool,
        }
    }

    /// Add a link. Adding a URL that is already present returns the
    /// existing record unchanged and triggers no new enrichment.
    pub fn add(
        &self,
        url: &str,
        title: Option<&str>,
    ) -> Result<VideoLinkRecord, RegistryError> {
        if url.trim().is_empty() {
            return Err(RegistryError::InvalidInput("url is empty".to_string()));
        }

        let record = {
            let mut links = self.state.lock_links();
            if let Some(existing) = links.iter().find(|l| l.url == url) {
                debug!("link already present for {}", url);
                return Ok(existing.clone());
            }

            let record = VideoLinkRecord::new(url, title, self.state.validator.as_ref());
            links.insert(0, record.clone());
            self.state.persist(&links);
            record
        };

        info!("added link {} ({})", record.id, record.url);
        self.pool.schedule(Arc::clone(&self.state), record.clone());
        Ok(record)
    }

    /// Remove a link and its cached thumbnail. Returns whether a
    /// record was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut links = self.state.lock_links();
        let Some(pos) = links.iter().position(|l| l.id == id) else {
            return false;
        };

        let removed = links.remove(pos);
        if let Some(path) = &removed.thumbnail_path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to delete thumbnail {}: {}", path.display(), e),
            }
        }

        self.state.persist(&links);
        info!("removed link {}", id);
        true
    }

    /// Rename a link. Returns false when the id is unknown.
    pub fn update_title(&self, id: &str, new_title: &str) -> bool {
        let mut links = self.state.lock_links();
        let Some(record) = links.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        record.title = new_title.to_string();
        self.state.persist(&links);
        true
    }

    /// Replace a stored record wholesale by id. Returns false when
    /// the id is unknown.
    pub fn update_record(&self, record: VideoLinkRecord) -> bool {
        self.state.update_record(record)
    }

    /// Record one access of a link. Unknown ids are silently ignored.
    pub fn mark_accessed(&self, id: &str) {
        let mut links = self.state.lock_links();
        if let Some(record) = links.iter_mut().find(|l| l.id == id) {
            record.mark_accessed();
            self.state.persist(&links);
        }
    }

    /// Snapshot of the sequence in stored order (most recent first).
    pub fn list(&self) -> Vec<VideoLinkRecord> {
        self.state.lock_links().clone()
    }

    /// Snapshot sorted by the given order. The sort is stable, so
    /// ties keep the stored sequence order.
    pub fn sorted(&self, order: SortOrder) -> Vec<VideoLinkRecord> {
        let mut links = self.list();
        match order {
            SortOrder::DateAddedDesc => links.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
            SortOrder::DateAddedAsc => links.sort_by(|a, b| a.date_added.cmp(&b.date_added)),
            SortOrder::TitleAsc => links.sort_by(|a, b| {
                a.display_title()
                    .to_lowercase()
                    .cmp(&b.display_title().to_lowercase())
            }),
            SortOrder::TitleDesc => links.sort_by(|a, b| {
                b.display_title()
                    .to_lowercase()
                    .cmp(&a.display_title().to_lowercase())
            }),
            SortOrder::MostAccessed => links.sort_by(|a, b| b.access_count.cmp(&a.access_count)),
            SortOrder::LastAccessed => {
                links.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed))
            }
        }
        links
    }

    /// Records whose title, URL, or description contains the query as
    /// a case-insensitive substring, in stored order. A blank query
    /// returns the whole list.
    pub fn search(&self, query: &str) -> Vec<VideoLinkRecord> {
        if query.trim().is_empty() {
            return self.list();
        }

        let needle = query.to_lowercase();
        self.state
            .lock_links()
            .iter()
            .filter(|l| {
                l.display_title().to_lowercase().contains(&needle)
                    || l.url.to_lowercase().contains(&needle)
                    || l.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Look up a single record by id.
    pub fn find_by_id(&self, id: &str) -> Option<VideoLinkRecord> {
        self.state.lock_links().iter().find(|l| l.id == id).cloned()
    }

    /// Delete every link and every cached thumbnail.
    pub fn clear_all(&self) {
        let mut links = self.state.lock_links();

        if let Ok(entries) = std::fs::read_dir(&self.state.thumbnails_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    if let Err(e) = std::fs::remove_file(&path) {
                        warn!("failed to delete thumbnail {}: {}", path.display(), e);
                    }
                }
            }
        }

        links.clear();
        self.state.persist(&links);
        info!("cleared link registry");
    }

    /// Number of links in the registry.
    pub fn total_count(&self) -> usize {
        self.state.lock_links().len()
    }

    /// Wait for every scheduled enrichment task to finish.
    pub async fn drain(&self) {
        self.pool.drain().await;
    }

    /// Stop accepting enrichment work and abandon in-flight tasks.
    /// Abandoned tasks stop at their next await point; a write-back
    /// already underway completes, so the persisted blob stays whole.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
