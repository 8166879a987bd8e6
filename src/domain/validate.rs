//! URL validity predicate for network video links.

use url::Url;

/// Schemes the playback pipeline accepts for network media.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "rtsp", "rtmp"];

/// Decides whether a URL points at a network resource the player
/// can handle. Pluggable so hosts with their own URI rules can
/// substitute their own check.
pub trait UrlValidator: Send + Sync {
    fn is_supported(&self, url: &str) -> bool;
}

/// Default validator: parseable URL with a supported scheme and a host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemeValidator;

impl UrlValidator for SchemeValidator {
    fn is_supported(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|u| SUPPORTED_SCHEMES.contains(&u.scheme()) && u.host_str().is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_schemes() {
        let v = SchemeValidator;
        assert!(v.is_supported("http://example.com/video.mp4"));
        assert!(v.is_supported("https://example.com/video.mp4"));
        assert!(v.is_supported("rtsp://camera.local/stream"));
        assert!(v.is_supported("rtmp://live.example.com/app"));
    }

    #[test]
    fn test_rejected_inputs() {
        let v = SchemeValidator;
        assert!(!v.is_supported("file:///sdcard/video.mp4"));
        assert!(!v.is_supported("ftp://example.com/video.mp4"));
        assert!(!v.is_supported("not a url"));
        assert!(!v.is_supported(""));
    }
}
