//! Placeholder thumbnail generation.
//!
//! Real frame capture is out of scope; the placeholder is a solid
//! 320x180 image whose color is derived from a hash of the URL, so
//! the same link always renders the same tile.

use std::path::Path;

use image::{Rgb, RgbImage};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const THUMBNAIL_WIDTH: u32 = 320;
pub const THUMBNAIL_HEIGHT: u32 = 180;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a thumbnail file for a URL.
pub trait ThumbnailRenderer: Send + Sync {
    fn render(&self, url: &str, dest: &Path) -> Result<(), ThumbnailError>;
}

/// Solid-color placeholder renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderRenderer;

impl ThumbnailRenderer for PlaceholderRenderer {
    fn render(&self, url: &str, dest: &Path) -> Result<(), ThumbnailError> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tile = RgbImage::from_pixel(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, placeholder_color(url));
        tile.save(dest)?;
        Ok(())
    }
}

/// Deterministic color from the first bytes of the URL hash.
pub fn placeholder_color(url: &str) -> Rgb<u8> {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    Rgb([digest[0], digest[1], digest[2]])
}
