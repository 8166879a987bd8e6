//! Best-effort background enrichment of link records.
//!
//! Enrichment runs off the caller's critical path: `add` schedules a
//! task and returns immediately. Each task runs the format/title
//! heuristic, then thumbnail generation, and pushes the mutated
//! record back into the registry so the change is persisted. Failures
//! are logged per task and never abort the pool or reach the caller.

pub mod metadata;
pub mod thumbnail;

pub use metadata::{HeuristicProber, MetadataProber, ProbeOutcome};
pub use thumbnail::{
    PlaceholderRenderer, ThumbnailError, ThumbnailRenderer, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::VideoLinkRecord;
use crate::registry::RegistryState;

/// Default number of enrichment tasks allowed to run at once.
pub const DEFAULT_WORKERS: usize = 3;

/// Bounded pool of fire-and-forget enrichment tasks.
pub struct EnrichmentPool {
    semaphore: Arc<Semaphore>,
    prober: Arc<dyn MetadataProber>,
    renderer: Arc<dyn ThumbnailRenderer>,
    accepting: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EnrichmentPool {
    /// Pool with the stock URL-pattern heuristics.
    pub fn new(workers: usize) -> Self {
        Self::with_strategies(
            workers,
            Arc::new(HeuristicProber),
            Arc::new(PlaceholderRenderer),
        )
    }

    /// Pool with caller-supplied probing and rendering strategies.
    pub fn with_strategies(
        workers: usize,
        prober: Arc<dyn MetadataProber>,
        renderer: Arc<dyn ThumbnailRenderer>,
    ) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            prober,
            renderer,
            accepting: AtomicBool::new(true),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Schedule enrichment for a record. Returns immediately; the
    /// task write-back goes through the registry so the sequence lock
    /// and persistence both apply.
    pub(crate) fn schedule(&self, state: Arc<RegistryState>, record: VideoLinkRecord) {
        if !self.accepting.load(Ordering::SeqCst) {
            debug!("enrichment pool shut down, dropping task for {}", record.id);
            return;
        }

        let semaphore = Arc::clone(&self.semaphore);
        let prober = Arc::clone(&self.prober);
        let renderer = Arc::clone(&self.renderer);

        let handle = tokio::spawn(async move {
            // Closed semaphore means the pool was shut down after spawn.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };

            let id = record.id.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                enrich(&state, record, prober.as_ref(), renderer.as_ref());
            })
            .await;

            if let Err(e) = outcome {
                warn!("enrichment task for {} panicked: {}", id, e);
            }
        });

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Wait for every scheduled task to finish.
    pub async fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!("enrichment task panicked: {}", e);
                }
            }
        }
    }

    /// Stop accepting new tasks and abandon in-flight ones at their
    /// next await point.
    pub fn shutdown(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        self.semaphore.close();

        let handles: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            handle.abort();
        }
    }
}

/// Run both enrichment stages for one record and write the result
/// back. A failed stage leaves earlier updates in place; whatever
/// succeeded is still written back and persisted.
fn enrich(
    state: &RegistryState,
    mut record: VideoLinkRecord,
    prober: &dyn MetadataProber,
    renderer: &dyn ThumbnailRenderer,
) {
    let outcome = prober.probe(&record.url);
    record.format = outcome.format;
    if let Some(title) = outcome.title_override {
        record.title = title;
    }

    let dest = state.thumbnail_path_for(&record.id);
    match renderer.render(&record.url, &dest) {
        Ok(()) => record.thumbnail_path = Some(dest),
        Err(e) => warn!("thumbnail generation failed for {}: {}", record.url, e),
    }

    let thumbnail = record.thumbnail_path.clone();
    if !state.update_record(record) {
        // The link was removed while we worked; drop the orphan file.
        if let Some(path) = thumbnail {
            let _ = std::fs::remove_file(path);
        }
        debug!("link disappeared before enrichment finished");
    }
}
