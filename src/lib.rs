//! linkreel - persistent registry of network video links
//!
//! A small library (plus CLI) that adds, dedups, enriches, sorts,
//! searches, and durably stores metadata records for user-supplied
//! video URLs.
//!
//! # Architecture
//!
//! - The registry owns the in-memory record sequence behind a single
//!   lock; every mutation persists the whole sequence as one JSON
//!   blob through an opaque string-keyed store.
//! - Enrichment (format/title heuristics, placeholder thumbnails)
//!   runs on a bounded background pool and writes results back
//!   through the registry, so the lock and persistence both apply.
//! - Persistence is best-effort: the in-memory state stays
//!   authoritative when a save fails.
//!
//! # Modules
//!
//! - `domain`: the record entity and URL validity predicate
//! - `registry`: CRUD, search/sort, dedup, and the persistence codec
//! - `store`: string-keyed blob storage backends
//! - `enrich`: background enrichment pool and its pluggable strategies
//! - `import`: local media file import utility
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Add a link (enriched before the process exits)
//! linkreel add https://example.com/movies/holiday.mp4
//!
//! # List, newest first
//! linkreel list
//!
//! # Search by title, URL, or description
//! linkreel search holiday
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod import;
pub mod registry;
pub mod store;

// Re-export main types at crate root for convenience
pub use domain::{SchemeValidator, UrlValidator, VideoLinkRecord};
pub use enrich::{
    EnrichmentPool, HeuristicProber, MetadataProber, PlaceholderRenderer, ProbeOutcome,
    ThumbnailRenderer,
};
pub use import::MediaImporter;
pub use registry::{LinkRegistry, RegistryError, SortOrder};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore};
