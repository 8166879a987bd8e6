//! Serialization of the record sequence to a single JSON blob.
//!
//! Encoding and decoding are exact inverses for anything a prior
//! encode produced. Decoding anything else is best-effort: a blob
//! that is not a JSON array reads as an empty library, and elements
//! that fail to decode are skipped rather than failing the load.

use serde_json::Value;
use tracing::warn;

use crate::domain::link::generate_id;
use crate::domain::VideoLinkRecord;

/// Encode records as a JSON array, preserving order.
pub fn encode(records: &[VideoLinkRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

/// Decode a persisted blob. Never fails: a corrupt blob is treated as
/// an empty library.
pub fn decode(blob: &str) -> Vec<VideoLinkRecord> {
    if blob.trim().is_empty() {
        return Vec::new();
    }

    let values: Vec<Value> = match serde_json::from_str(blob) {
        Ok(values) => values,
        Err(e) => {
            warn!("discarding unreadable link blob: {}", e);
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<VideoLinkRecord>(value) {
            Ok(mut record) => {
                // Older blobs wrote an empty string for "no thumbnail".
                if record
                    .thumbnail_path
                    .as_deref()
                    .is_some_and(|p| p.as_os_str().is_empty())
                {
                    record.thumbnail_path = None;
                }
                // Ids are restored verbatim; only records persisted
                // without one get a fresh id.
                if record.id.is_empty() {
                    record.id = generate_id(&record.url);
                }
                records.push(record);
            }
            Err(e) => warn!("skipping undecodable link entry: {}", e),
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SchemeValidator;
    use std::path::PathBuf;

    fn sample(url: &str) -> VideoLinkRecord {
        VideoLinkRecord::new(url, None, &SchemeValidator)
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let mut a = sample("https://example.com/movies/holiday.mp4");
        a.description = "from the trip".to_string();
        a.duration_ms = 65_000;
        a.format = "MP4".to_string();
        a.thumbnail_path = Some(PathBuf::from("/tmp/thumb_a.jpg"));
        a.access_count = 4;

        let b = sample("https://vimeo.com/12345");

        let records = vec![a, b];
        let blob = encode(&records).unwrap();
        let decoded = decode(&blob);

        assert_eq!(decoded, records);
    }

    #[test]
    fn test_wire_field_names() {
        let record = sample("https://example.com/a.mp4");
        let blob = encode(std::slice::from_ref(&record)).unwrap();
        let value: Vec<Value> = serde_json::from_str(&blob).unwrap();

        let obj = value[0].as_object().unwrap();
        for key in [
            "id",
            "url",
            "title",
            "description",
            "duration",
            "format",
            "thumbnailPath",
            "dateAdded",
            "lastAccessed",
            "accessCount",
            "isValidUrl",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert_eq!(obj["duration"], Value::from(-1));
        assert!(obj["thumbnailPath"].is_null());
        assert!(obj["dateAdded"].is_i64() || obj["dateAdded"].is_u64());
    }

    #[test]
    fn test_corrupt_blob_reads_as_empty() {
        assert!(decode("").is_empty());
        assert!(decode("   ").is_empty());
        assert!(decode("not json").is_empty());
        assert!(decode(r#"{"links": []}"#).is_empty());
    }

    #[test]
    fn test_bad_elements_are_skipped() {
        let blob = r#"[
            {"id": "link_a", "url": "https://example.com/a.mp4"},
            {"title": "no url, dropped"},
            {"id": "link_b", "url": "https://example.com/b.mp4"}
        ]"#;

        let decoded = decode(blob);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, "link_a");
        assert_eq!(decoded[1].id, "link_b");
    }

    #[test]
    fn test_missing_optional_fields_get_defaults() {
        let blob = r#"[{"id": "link_x", "url": "https://example.com/x.mp4"}]"#;
        let decoded = decode(blob);

        let r = &decoded[0];
        assert_eq!(r.duration_ms, -1);
        assert_eq!(r.format, "");
        assert_eq!(r.description, "");
        assert_eq!(r.access_count, 0);
        assert!(r.is_valid_url);
        assert!(r.thumbnail_path.is_none());
    }

    #[test]
    fn test_empty_thumbnail_path_normalized_to_none() {
        let blob = r#"[{"id": "x", "url": "https://example.com/x.mp4", "thumbnailPath": ""}]"#;
        let decoded = decode(blob);
        assert!(decoded[0].thumbnail_path.is_none());
    }

    #[test]
    fn test_record_without_id_gets_one() {
        let blob = r#"[{"url": "https://example.com/x.mp4"}]"#;
        let decoded = decode(blob);
        assert!(decoded[0].id.starts_with("link_"));
    }
}
