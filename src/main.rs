use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use top_albums::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_FETCH_TIMEOUT_SEC, DEFAULT_READ_POOL_SIZE,
};
use top_albums::feed::{FeedFetcher, FileFeedFetcher, HttpFeedFetcher};
use top_albums::{
    IngestionService, QueryEngine, QueryError, QueryRequest, ReconciliationEngine,
    SqliteAlbumStore,
};

/// Exit code of a query rejected by validation.
const EXIT_INVALID_REQUEST: i32 = 2;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[derive(Parser, Debug)]
#[command(version, about = "Top albums feed ingestion and catalog queries")]
struct CliArgs {
    /// Path to a TOML configuration file. Its values override the flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite album database file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Timeout in seconds for feed requests.
    #[clap(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SEC)]
    pub fetch_timeout_sec: u64,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the feed and reconcile it into the catalog.
    Ingest {
        /// URL of the feed, defaults to the configured one.
        #[clap(long)]
        feed_url: Option<String>,

        /// Read the feed from a local file instead.
        #[clap(long, value_parser = parse_path, conflicts_with = "feed_url")]
        feed_file: Option<PathBuf>,
    },

    /// Query the catalog.
    Query {
        /// Filter as `field[__op]=value`, may be repeated.
        #[clap(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Comma-separated sort keys, `-field` for descending.
        #[clap(long)]
        sort: Option<String>,

        #[clap(long, allow_negative_numbers = true)]
        page_size: Option<i64>,

        #[clap(long, allow_negative_numbers = true)]
        page: Option<i64>,
    },

    /// Report whether the database is reachable.
    Health,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn ingest(
    config: &AppConfig,
    store: Arc<SqliteAlbumStore>,
    feed_file: Option<PathBuf>,
) -> Result<()> {
    let (fetcher, location): (Arc<dyn FeedFetcher>, String) = match feed_file {
        Some(path) => (
            Arc::new(FileFeedFetcher),
            path.to_string_lossy().to_string(),
        ),
        None => (
            Arc::new(HttpFeedFetcher::new(config.fetch_timeout())?),
            config.feed_url.clone(),
        ),
    };

    let service = IngestionService::new(fetcher, ReconciliationEngine::new(store));
    let summary = service
        .run(&location)
        .await
        .with_context(|| format!("Ingestion of {} failed", location))?;
    print_json(&summary)
}

async fn query(store: Arc<SqliteAlbumStore>, request: QueryRequest) -> Result<()> {
    let engine = QueryEngine::new(store);
    let result = tokio::task::spawn_blocking(move || engine.query(&request)).await?;
    match result {
        Ok(result) => print_json(&result),
        Err(e) if e.is_validation_error() => {
            eprintln!(
                "{}",
                json!({ "error": e.to_string(), "parameter": e.param() })
            );
            std::process::exit(EXIT_INVALID_REQUEST);
        }
        Err(QueryError::Store(e)) => Err(e).context("Query failed"),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    let feed_url = match &cli_args.command {
        Command::Ingest { feed_url, .. } => feed_url.clone(),
        _ => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        feed_url,
        fetch_timeout_sec: cli_args.fetch_timeout_sec,
        read_pool_size: cli_args.read_pool_size,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    if let Command::Health = cli_args.command {
        let healthy = match SqliteAlbumStore::check_existing(&config.db_path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to open album database: {}", e);
                false
            }
        };
        print_json(&json!({ "database": healthy }))?;
        if !healthy {
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Opening album database at {:?}...", config.db_path);
    let store = Arc::new(
        SqliteAlbumStore::new(&config.db_path, config.read_pool_size)
            .with_context(|| format!("Failed to open album database {:?}", config.db_path))?,
    );

    match cli_args.command {
        Command::Ingest { feed_file, .. } => ingest(&config, store, feed_file).await,
        Command::Query {
            filters,
            sort,
            page_size,
            page,
        } => {
            let mut request = QueryRequest {
                filters,
                ..QueryRequest::new()
            };
            if let Some(sort) = sort {
                request = request.sort_by(&sort);
            }
            request.page.page_size = page_size;
            request.page.page_number = page;
            query(store, request).await
        }
        Command::Health => Ok(()),
    }
}
