//! Local media file import.
//!
//! Copies files into the app-private media library, generating a
//! unique on-disk name when the desired one is taken. Independent of
//! the link registry; no shared state.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source file not found: {0}")]
    SourceMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Manages media files in the app-private library directory.
pub struct MediaImporter {
    library_dir: PathBuf,
}

impl MediaImporter {
    /// Open the importer, creating the library directory if needed.
    pub async fn new(library_dir: PathBuf) -> Result<Self, ImportError> {
        fs::create_dir_all(&library_dir).await?;
        Ok(Self { library_dir })
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Copy a file into the library under `desired_name`, renaming to
    /// `name_1.ext`, `name_2.ext`, ... if the name is taken. Returns
    /// the destination path.
    pub async fn import_file(
        &self,
        source: &Path,
        desired_name: &str,
    ) -> Result<PathBuf, ImportError> {
        if fs::metadata(source).await.is_err() {
            return Err(ImportError::SourceMissing(source.to_path_buf()));
        }

        let dest = self.library_dir.join(self.unique_name(desired_name).await);
        fs::copy(source, &dest).await?;

        info!("imported {} as {}", source.display(), dest.display());
        Ok(dest)
    }

    async fn unique_name(&self, original: &str) -> String {
        let mut candidate = original.to_string();
        let mut counter = 1;

        while fs::try_exists(self.library_dir.join(&candidate))
            .await
            .unwrap_or(false)
        {
            candidate = match original.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => {
                    format!("{}_{}.{}", stem, counter, ext)
                }
                _ => format!("{}_{}", original, counter),
            };
            counter += 1;
        }

        candidate
    }

    /// Delete a file from the library. Returns whether it existed.
    pub async fn remove(&self, file_name: &str) -> Result<bool, ImportError> {
        match fs::remove_file(self.library_dir.join(file_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Total bytes used by files in the library.
    pub async fn total_storage_used(&self) -> Result<u64, ImportError> {
        let mut total = 0;
        let mut entries = fs::read_dir(&self.library_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if meta.is_file() {
                total += meta.len();
            }
        }

        Ok(total)
    }

    /// Delete every file in the library.
    pub async fn clear(&self) -> Result<(), ImportError> {
        let mut entries = fs::read_dir(&self.library_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.metadata().await?.is_file() {
                fs::remove_file(entry.path()).await?;
            }
        }

        Ok(())
    }
}
