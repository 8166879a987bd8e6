//! Command-line interface for linkreel.
//!
//! Provides commands for adding, listing, searching, and removing
//! network video links, and for importing local media files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config;
use crate::domain::{SchemeValidator, VideoLinkRecord};
use crate::enrich::EnrichmentPool;
use crate::import::MediaImporter;
use crate::registry::{LinkRegistry, SortOrder};
use crate::store::FileBlobStore;

/// linkreel - persistent registry of network video links
#[derive(Parser, Debug)]
#[command(name = "linkreel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a network video link
    Add {
        /// URL of the video
        url: String,

        /// Custom title (derived from the URL if not specified)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List links in the library
    List {
        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortArg::DateDesc)]
        sort: SortArg,

        /// Maximum number of links to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Search links by title, URL, or description
    Search {
        /// Search query
        query: String,
    },

    /// Show details of a link
    Show {
        /// Link ID
        id: String,
    },

    /// Print a link's URL and record the access
    Open {
        /// Link ID
        id: String,
    },

    /// Remove a link
    Remove {
        /// Link ID
        id: String,
    },

    /// Remove every link and cached thumbnail
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Import a local media file into the library
    Import {
        /// Source file
        source: PathBuf,

        /// Name to store the file under (source filename if omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Sort order for the list command (maps to SortOrder)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Newest first
    DateDesc,
    /// Oldest first
    DateAsc,
    /// Title A-Z
    Title,
    /// Title Z-A
    TitleDesc,
    /// Most opened first
    MostAccessed,
    /// Most recently opened first
    LastAccessed,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::DateDesc => SortOrder::DateAddedDesc,
            SortArg::DateAsc => SortOrder::DateAddedAsc,
            SortArg::Title => SortOrder::TitleAsc,
            SortArg::TitleDesc => SortOrder::TitleDesc,
            SortArg::MostAccessed => SortOrder::MostAccessed,
            SortArg::LastAccessed => SortOrder::LastAccessed,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Add { url, title } => add_link(&url, title.as_deref()).await,
            Commands::List { sort, limit } => list_links(sort, limit),
            Commands::Search { query } => search_links(&query),
            Commands::Show { id } => show_link(&id),
            Commands::Open { id } => open_link(&id),
            Commands::Remove { id } => remove_link(&id),
            Commands::Clear { yes } => clear_links(yes),
            Commands::Import { source, name } => import_file(&source, name).await,
            Commands::Config => show_config(),
        }
    }
}

/// Open the registry with the configured store and thumbnail paths.
fn open_registry() -> Result<LinkRegistry> {
    let store = FileBlobStore::new(config::links_store_dir()?);
    Ok(LinkRegistry::with_options(
        Box::new(store),
        config::thumbnails_dir()?,
        Arc::new(SchemeValidator),
        EnrichmentPool::new(config::enrichment_workers()?),
    ))
}

async fn add_link(url: &str, title: Option<&str>) -> Result<()> {
    let registry = open_registry()?;
    let record = registry
        .add(url, title)
        .context("Failed to add link")?;

    // One-shot process: let enrichment finish before reporting.
    registry.drain().await;

    let enriched = registry.find_by_id(&record.id).unwrap_or(record);
    println!("Added {}", enriched.id);
    print_record(&enriched);
    Ok(())
}

fn list_links(sort: SortArg, limit: usize) -> Result<()> {
    let registry = open_registry()?;
    let links = registry.sorted(sort.into());

    if links.is_empty() {
        println!("Library is empty");
        return Ok(());
    }

    println!("{} link(s):", registry.total_count());
    for link in links.iter().take(limit) {
        print_row(link);
    }
    Ok(())
}

fn search_links(query: &str) -> Result<()> {
    let registry = open_registry()?;
    let matches = registry.search(query);

    if matches.is_empty() {
        println!("No links matching '{}'", query);
        return Ok(());
    }

    println!("{} match(es):", matches.len());
    for link in &matches {
        print_row(link);
    }
    Ok(())
}

fn show_link(id: &str) -> Result<()> {
    let registry = open_registry()?;
    match registry.find_by_id(id) {
        Some(record) => {
            print_record(&record);
            Ok(())
        }
        None => anyhow::bail!("No link with id {}", id),
    }
}

fn open_link(id: &str) -> Result<()> {
    let registry = open_registry()?;
    let Some(record) = registry.find_by_id(id) else {
        anyhow::bail!("No link with id {}", id);
    };

    registry.mark_accessed(id);
    println!("{}", record.url);
    Ok(())
}

fn remove_link(id: &str) -> Result<()> {
    let registry = open_registry()?;
    if registry.remove(id) {
        println!("Removed {}", id);
    } else {
        println!("No link with id {}", id);
    }
    Ok(())
}

fn clear_links(yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("Refusing to clear the library without --yes");
    }

    let registry = open_registry()?;
    let count = registry.total_count();
    registry.clear_all();
    println!("Removed {} link(s)", count);
    Ok(())
}

async fn import_file(source: &PathBuf, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => source
            .file_name()
            .and_then(|n| n.to_str())
            .context("Source path has no usable filename")?
            .to_string(),
    };

    let importer = MediaImporter::new(config::media_library_dir()?).await?;
    let dest = importer
        .import_file(source, &name)
        .await
        .context("Failed to import file")?;

    println!("Imported to {}", dest.display());
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("home:               {}", config::home()?.display());
    println!("links store:        {}", config::links_store_dir()?.display());
    println!("thumbnails:         {}", config::thumbnails_dir()?.display());
    println!("media library:      {}", config::media_library_dir()?.display());
    println!("enrichment workers: {}", config.enrichment_workers);
    match &config.config_file {
        Some(path) => println!("config file:        {}", path.display()),
        None => println!("config file:        (none)"),
    }
    Ok(())
}

fn print_row(link: &VideoLinkRecord) {
    let format = if link.format.is_empty() {
        "?"
    } else {
        &link.format
    };
    println!(
        "  {}  [{}] {} ({}, {} plays)",
        link.id,
        format,
        link.display_title(),
        link.duration_string(),
        link.access_count,
    );
}

fn print_record(record: &VideoLinkRecord) {
    println!("id:          {}", record.id);
    println!("title:       {}", record.display_title());
    println!("url:         {}", record.url);
    if !record.description.is_empty() {
        println!("description: {}", record.description);
    }
    println!(
        "format:      {}",
        if record.format.is_empty() {
            "(unknown)"
        } else {
            &record.format
        }
    );
    println!("duration:    {}", record.duration_string());
    println!("valid url:   {}", record.is_valid_url);
    println!("added:       {}", record.date_added.to_rfc3339());
    println!("accessed:    {} time(s)", record.access_count);
    if let Some(thumb) = &record.thumbnail_path {
        println!("thumbnail:   {}", thumb.display());
    }
}
