use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use digital_archive::config::{find_config_file, load_config, Config};
use digital_archive::hydrate::{hydrate_all, Hydrateable};
use digital_archive::matching::{FilterValue, SearchFilters, Searchable};
use digital_archive::models::de::parse_archive_date;
use digital_archive::models::{
    Collection, Contributor, Coverage, Document, Repository, ResourceKind, ResourceRef, Subject,
    Theme,
};
use digital_archive::Archive;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Digital Archive - Search and fetch historical documents from the Wilson Center Digital Archive
#[derive(Parser, Debug)]
#[command(name = "digital-archive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search and fetch records from the Wilson Center Digital Archive", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Archive base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Record kinds with a search endpoint
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SearchKind {
    Document,
    Collection,
    Subject,
    Contributor,
    Coverage,
    Repository,
}

/// Record kinds that can be fetched by id
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RecordKind {
    Document,
    Collection,
    Subject,
    Contributor,
    Coverage,
    Repository,
    /// Looked up by slug
    Theme,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search one kind of record
    #[command(alias = "s")]
    Search {
        /// Kind of record to search
        #[arg(value_enum)]
        kind: SearchKind,

        /// Filter as name=value. Relation filters (collections, subjects, ...) take
        /// comma-separated ids, languages take ISO 639-2/B codes, dates take YYYYMMDD
        #[arg(long = "filter", short = 'f', value_parser = parse_filter_arg)]
        filters: Vec<(String, String)>,

        /// Records per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Stop after this many records
        #[arg(long, short)]
        limit: Option<usize>,

        /// Hydrate every result
        #[arg(long)]
        hydrate: bool,

        /// Hydrate documents together with their assets and collections
        #[arg(long)]
        recurse: bool,
    },

    /// Fetch one full record
    #[command(alias = "g")]
    Get {
        #[arg(value_enum)]
        kind: RecordKind,

        /// Record id (slug for themes)
        key: String,

        /// Also hydrate a document's assets and collections
        #[arg(long)]
        recurse: bool,
    },

    /// Show the earliest and latest document dates in the archive
    DateRange,
}

fn parse_filter_arg(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

/// Kind of record a plural relation filter refers to.
fn relation_kind(name: &str) -> Option<ResourceKind> {
    Some(match name {
        "collections" => ResourceKind::Collection,
        "publishers" => ResourceKind::Publisher,
        "repositories" => ResourceKind::Repository,
        "original_coverages" => ResourceKind::Coverage,
        "subjects" => ResourceKind::Subject,
        "contributors" => ResourceKind::Contributor,
        "donors" => ResourceKind::Donor,
        "translations" => ResourceKind::Translation,
        "themes" => ResourceKind::Theme,
        _ => return None,
    })
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Turn one command-line filter into a typed filter value.
fn filter_value(name: &str, value: &str) -> FilterValue {
    if let Some(kind) = relation_kind(name) {
        return FilterValue::List(
            split_list(value)
                .map(|id| FilterValue::Resource(ResourceRef::new(kind, id)))
                .collect(),
        );
    }
    match name {
        "languages" => FilterValue::List(split_list(value).map(FilterValue::from).collect()),
        "start_date" | "end_date" => parse_archive_date(value)
            .map(FilterValue::Date)
            .unwrap_or_else(|| FilterValue::from(value)),
        _ => FilterValue::from(value),
    }
}

fn build_filters(raw: &[(String, String)], page_size: Option<u32>) -> SearchFilters {
    let filters = raw.iter().fold(SearchFilters::new(), |filters, (name, value)| {
        filters.with(name.as_str(), filter_value(name, value))
    });
    match page_size {
        Some(size) => filters.items_per_page(size),
        None => filters,
    }
}

#[derive(Debug, Serialize)]
struct SearchOutput<T> {
    count: usize,
    results: Vec<T>,
}

async fn run_search<T: Searchable + Hydrateable>(
    archive: &Archive,
    filters: SearchFilters,
    limit: Option<usize>,
    hydrate: bool,
    recurse: bool,
) -> Result<()> {
    let mut results = T::search(archive, filters).await?;
    tracing::info!("{} {} records match", results.count(), T::KIND);

    let mut records = match limit {
        Some(limit) => {
            let mut records = Vec::with_capacity(limit.min(results.count()));
            while records.len() < limit {
                match results.next().await? {
                    Some(record) => records.push(record.clone()),
                    None => break,
                }
            }
            records
        }
        None => results.all().await?.to_vec(),
    };

    if hydrate || recurse {
        hydrate_all(archive, &mut records, recurse).await?;
    }

    print_json(&SearchOutput {
        count: results.count(),
        results: records,
    })
}

async fn run_get<T: Hydrateable>(archive: &Archive, key: &str, recurse: bool) -> Result<()> {
    let mut record: T = archive
        .get(key)
        .await
        .with_context(|| format!("Failed to fetch {} {}", T::KIND, key))?;
    if recurse {
        record.hydrate_recursive(archive).await?;
    }
    print_json(&record)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    let json = config.logging.format.as_deref() == Some("json");

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("digital_archive={}", level)),
        ))
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(base_url) = &cli.base_url {
        config.archive.base_url = base_url.clone();
    }
    if cli.insecure {
        config.http.accept_invalid_certs = true;
    }

    init_logging(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let archive = Archive::from_config(&config)?;

    match cli.command {
        Commands::Search {
            kind,
            filters,
            page_size,
            limit,
            hydrate,
            recurse,
        } => {
            if kind != SearchKind::Document && recurse {
                bail!("--recurse only applies to document searches");
            }
            let filters = build_filters(&filters, page_size);
            match kind {
                SearchKind::Document => {
                    run_search::<Document>(&archive, filters, limit, hydrate, recurse).await
                }
                SearchKind::Collection => {
                    run_search::<Collection>(&archive, filters, limit, hydrate, recurse).await
                }
                SearchKind::Subject => {
                    run_search::<Subject>(&archive, filters, limit, hydrate, recurse).await
                }
                SearchKind::Contributor => {
                    run_search::<Contributor>(&archive, filters, limit, hydrate, recurse).await
                }
                SearchKind::Coverage => {
                    run_search::<Coverage>(&archive, filters, limit, hydrate, recurse).await
                }
                SearchKind::Repository => {
                    run_search::<Repository>(&archive, filters, limit, hydrate, recurse).await
                }
            }
        }
        Commands::Get { kind, key, recurse } => match kind {
            RecordKind::Document => run_get::<Document>(&archive, &key, recurse).await,
            RecordKind::Collection => run_get::<Collection>(&archive, &key, recurse).await,
            RecordKind::Subject => run_get::<Subject>(&archive, &key, recurse).await,
            RecordKind::Contributor => run_get::<Contributor>(&archive, &key, recurse).await,
            RecordKind::Coverage => run_get::<Coverage>(&archive, &key, recurse).await,
            RecordKind::Repository => run_get::<Repository>(&archive, &key, recurse).await,
            RecordKind::Theme => run_get::<Theme>(&archive, &key, recurse).await,
        },
        Commands::DateRange => print_json(&archive.date_range().await?),
    }
}
