//! Configuration for linkreel paths.
//!
//! Sources (highest priority first):
//! 1. Environment variable (LINKREEL_HOME)
//! 2. Config file (.linkreel/config.yaml, searched upward from cwd)
//! 3. Default (~/.linkreel)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::enrich::DEFAULT_WORKERS;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub enrichment: Option<EnrichmentConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Home directory (relative to the config file's parent)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Concurrent enrichment task limit
    pub workers: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to linkreel home
    pub home: PathBuf,
    /// Concurrent enrichment task limit
    pub enrichment_workers: usize,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".linkreel").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".linkreel");

    let config_file = find_config_file();

    let (home, enrichment_workers) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        let home = if let Ok(env_home) = std::env::var("LINKREEL_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            let base = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(base, home_path)
        } else {
            default_home
        };

        let workers = config
            .enrichment
            .as_ref()
            .and_then(|e| e.workers)
            .unwrap_or(DEFAULT_WORKERS);

        (home, workers)
    } else {
        let home = std::env::var("LINKREEL_HOME")
            .map(PathBuf::from)
            .unwrap_or(default_home);

        (home, DEFAULT_WORKERS)
    };

    Ok(ResolvedConfig {
        home,
        enrichment_workers,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the linkreel home directory.
pub fn home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Directory the serialized link registry lives in ($HOME/links)
pub fn links_store_dir() -> Result<PathBuf> {
    Ok(config()?.home.join("links"))
}

/// Directory cached thumbnails are written to ($HOME/thumbnails)
pub fn thumbnails_dir() -> Result<PathBuf> {
    Ok(config()?.home.join("thumbnails"))
}

/// Directory imported media files are copied into ($HOME/media_library)
pub fn media_library_dir() -> Result<PathBuf> {
    Ok(config()?.home.join("media_library"))
}

/// Concurrent enrichment task limit
pub fn enrichment_workers() -> Result<usize> {
    Ok(config()?.enrichment_workers)
}
