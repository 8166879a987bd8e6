//! The network video link record.
//!
//! Pure data plus derived helpers; all I/O and invariant enforcement
//! lives in the registry. Serde field names match the legacy persisted
//! layout, with timestamps as epoch milliseconds.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use super::validate::UrlValidator;

/// Extensions stripped from a filename when deriving a display title.
const TITLE_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "m4v", "3gp", "webm", "flv"];

/// Title used when nothing better can be derived.
pub const FALLBACK_TITLE: &str = "Network Video";

/// A single remote video reference with its library metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLinkRecord {
    /// Unique identifier, generated at creation and never reassigned.
    #[serde(default)]
    pub id: String,

    /// The source URL.
    pub url: String,

    /// User-supplied or heuristic display name.
    #[serde(default)]
    pub title: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Duration in milliseconds, -1 when unknown.
    #[serde(rename = "duration", default = "default_duration")]
    pub duration_ms: i64,

    /// Short container/protocol label ("MP4", "HLS", ...).
    #[serde(default)]
    pub format: String,

    /// Path to a locally cached thumbnail, if one has been generated.
    #[serde(rename = "thumbnailPath", default)]
    pub thumbnail_path: Option<PathBuf>,

    /// When the link was added to the library.
    #[serde(
        rename = "dateAdded",
        with = "chrono::serde::ts_milliseconds",
        default = "Utc::now"
    )]
    pub date_added: DateTime<Utc>,

    /// When the link was last opened.
    #[serde(
        rename = "lastAccessed",
        with = "chrono::serde::ts_milliseconds",
        default = "Utc::now"
    )]
    pub last_accessed: DateTime<Utc>,

    /// How many times the link has been opened.
    #[serde(rename = "accessCount", default)]
    pub access_count: u32,

    /// Whether the URL matched the validity predicate.
    #[serde(rename = "isValidUrl", default = "default_true")]
    pub is_valid_url: bool,
}

fn default_duration() -> i64 {
    -1
}

fn default_true() -> bool {
    true
}

impl VideoLinkRecord {
    /// Create a new record for a URL. An empty or missing title falls
    /// back to a name derived from the URL itself.
    pub fn new(url: impl Into<String>, title: Option<&str>, validator: &dyn UrlValidator) -> Self {
        let url = url.into();
        let now = now_millis();
        let title = match title {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => derive_title(&url),
        };

        Self {
            id: generate_id(&url),
            is_valid_url: validator.is_supported(&url),
            title,
            description: String::new(),
            duration_ms: -1,
            format: String::new(),
            thumbnail_path: None,
            date_added: now,
            last_accessed: now,
            access_count: 0,
            url,
        }
    }

    /// Reassign the URL, re-running the validity predicate.
    pub fn set_url(&mut self, url: impl Into<String>, validator: &dyn UrlValidator) {
        self.url = url.into();
        self.is_valid_url = validator.is_supported(&self.url);
    }

    /// Record one access: bump the counter and refresh the timestamp.
    pub fn mark_accessed(&mut self) {
        self.access_count += 1;
        self.last_accessed = now_millis();
    }

    /// Title for display, never blank.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            FALLBACK_TITLE
        } else {
            &self.title
        }
    }

    /// Human-readable duration: `H:MM:SS` past the hour mark, `M:SS`
    /// below it, `"Unknown"` when the duration has not been probed.
    pub fn duration_string(&self) -> String {
        if self.duration_ms <= 0 {
            return "Unknown".to_string();
        }

        let seconds = self.duration_ms / 1000;
        let minutes = seconds / 60;
        let hours = minutes / 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes % 60, seconds % 60)
        } else {
            format!("{}:{:02}", minutes, seconds % 60)
        }
    }

    /// Host component of the URL, if it parses.
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Whether a cached thumbnail exists on disk.
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_path
            .as_deref()
            .is_some_and(|p| p.exists())
    }
}

/// Current time truncated to milliseconds, the precision the wire
/// format carries. Keeps encode/decode an exact round trip.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Generate a record id from a hash of the URL plus the current time.
/// Unique enough for a single library, not globally.
pub fn generate_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();

    let hash: String = digest[..6].iter().map(|b| format!("{:02x}", b)).collect();
    format!("link_{}_{}", hash, Utc::now().timestamp_millis())
}

/// Derive a display title from the URL: last path segment with any
/// video extension stripped, then "Video from <host>", then the
/// generic fallback.
fn derive_title(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(segments) = parsed.path_segments() {
            if let Some(name) = segments.filter(|s| !s.is_empty()).last() {
                return strip_video_extension(name).to_string();
            }
        }

        if let Some(host) = parsed.host_str() {
            return format!("Video from {}", host);
        }
    }

    FALLBACK_TITLE.to_string()
}

fn strip_video_extension(name: &str) -> &str {
    for ext in TITLE_EXTENSIONS {
        if let Some(stem) = name.strip_suffix(&format!(".{}", ext)) {
            return stem;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SchemeValidator;

    fn record(url: &str, title: Option<&str>) -> VideoLinkRecord {
        VideoLinkRecord::new(url, title, &SchemeValidator)
    }

    #[test]
    fn test_title_from_filename() {
        let r = record("https://example.com/movies/holiday.mp4", None);
        assert_eq!(r.title, "holiday");

        let r = record("https://example.com/clips/raw.webm", None);
        assert_eq!(r.title, "raw");
    }

    #[test]
    fn test_title_keeps_unknown_extension() {
        let r = record("https://example.com/stream.m3u8", None);
        assert_eq!(r.title, "stream.m3u8");
    }

    #[test]
    fn test_title_falls_back_to_host() {
        let r = record("https://cdn.example.com/", None);
        assert_eq!(r.title, "Video from cdn.example.com");
    }

    #[test]
    fn test_title_fallback_for_unparseable_url() {
        let r = record("not a url at all", None);
        assert_eq!(r.title, FALLBACK_TITLE);
    }

    #[test]
    fn test_custom_title_wins() {
        let r = record("https://example.com/holiday.mp4", Some("Summer 2024"));
        assert_eq!(r.title, "Summer 2024");

        // Blank custom titles are ignored.
        let r = record("https://example.com/holiday.mp4", Some("  "));
        assert_eq!(r.title, "holiday");
    }

    #[test]
    fn test_duration_string() {
        let mut r = record("https://example.com/a.mp4", None);
        assert_eq!(r.duration_string(), "Unknown");

        r.duration_ms = 0;
        assert_eq!(r.duration_string(), "Unknown");

        r.duration_ms = 65_000;
        assert_eq!(r.duration_string(), "1:05");

        r.duration_ms = 3_665_000;
        assert_eq!(r.duration_string(), "1:01:05");
    }

    #[test]
    fn test_mark_accessed() {
        let mut r = record("https://example.com/a.mp4", None);
        let before = r.last_accessed;

        r.mark_accessed();
        assert_eq!(r.access_count, 1);
        assert!(r.last_accessed >= before);
        assert!(r.date_added <= r.last_accessed);

        r.mark_accessed();
        assert_eq!(r.access_count, 2);
    }

    #[test]
    fn test_validity_tracks_url_changes() {
        let mut r = record("https://example.com/a.mp4", None);
        assert!(r.is_valid_url);

        r.set_url("file:///sdcard/a.mp4", &SchemeValidator);
        assert!(!r.is_valid_url);
    }

    #[test]
    fn test_ids_differ_per_url() {
        let a = record("https://example.com/a.mp4", None);
        let b = record("https://example.com/b.mp4", None);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("link_"));
    }

    #[test]
    fn test_display_title_never_blank() {
        let mut r = record("https://example.com/a.mp4", None);
        r.title = String::new();
        assert_eq!(r.display_title(), FALLBACK_TITLE);
    }
}
