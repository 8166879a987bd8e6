//! Format and title heuristics for network links.
//!
//! These are URL-pattern stubs standing in for real media probing;
//! the trait seam lets a real prober replace them without touching
//! the registry.

use url::Url;

/// What probing a URL produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Short container/protocol label ("MP4", "HLS", ...).
    pub format: String,

    /// Platform title that replaces whatever the record carries.
    pub title_override: Option<String>,
}

/// Best-effort metadata detection for a URL.
pub trait MetadataProber: Send + Sync {
    fn probe(&self, url: &str) -> ProbeOutcome;
}

/// First matching marker wins, so extension checks come before the
/// looser manifest markers.
const FORMAT_MARKERS: &[(&str, &str)] = &[
    (".mp4", "MP4"),
    (".mkv", "MKV"),
    (".avi", "AVI"),
    (".mov", "MOV"),
    (".webm", "WebM"),
    ("m3u8", "HLS"),
    ("mpd", "DASH"),
];

/// Hosts whose links get a fixed platform title. This deliberately
/// overwrites user-supplied titles for those hosts.
const PLATFORM_TITLES: &[(&str, &str)] = &[
    ("youtube.com", "YouTube Video"),
    ("youtu.be", "YouTube Video"),
    ("vimeo.com", "Vimeo Video"),
    ("dailymotion.com", "Dailymotion Video"),
];

/// URL-pattern heuristics.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicProber;

impl MetadataProber for HeuristicProber {
    fn probe(&self, url: &str) -> ProbeOutcome {
        let lower = url.to_lowercase();

        let format = FORMAT_MARKERS
            .iter()
            .find(|(marker, _)| lower.contains(marker))
            .map(|(_, label)| (*label).to_string())
            .unwrap_or_else(|| "Stream".to_string());

        let title_override = Url::parse(&lower)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .and_then(|host| {
                PLATFORM_TITLES
                    .iter()
                    .find(|(platform, _)| {
                        host == *platform || host.ends_with(&format!(".{}", platform))
                    })
                    .map(|(_, title)| (*title).to_string())
            });

        ProbeOutcome {
            format,
            title_override,
        }
    }
}
