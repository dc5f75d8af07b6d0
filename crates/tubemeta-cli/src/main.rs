//! `tubemeta` - resolve YouTube metadata for media files.
//!
//! Results are printed to stdout as JSON; diagnostics go to stderr and the
//! log file.

mod cli;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info};
use tubemeta_core::{
    CacheStatus, ConfigManager, EntityKind, IdentifierClass, ItemKind, MetadataCache,
    MetadataResolver, ResolverConfig, YouTubeApiFetcher, extract_identifier,
};

use cli::{Cli, Command};
use logging::LoggingConfig;

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] tubemeta_core::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("No YouTube identifier found in {0:?}")]
    NoIdentifier(String),
}

#[derive(Debug, Serialize)]
struct IdReport {
    identifier: String,
    class: IdentifierClass,
    collection_entity: EntityKind,
    cache: CacheStatus,
    record_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logging = match logging::init(&logging_config(&cli)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("tubemeta: logging disabled: {e}");
            None
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Core(e)) if e.is_cancelled() => {
            eprintln!("tubemeta: interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = LoggingConfig::auto();
    if cli.verbose {
        config = config.with_console_level(Level::DEBUG);
    }
    if cli.no_log_file {
        config = config.with_log_directory(None);
    }
    config
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Id { name } => identify(name, &config),
        Command::Metadata(args) => {
            let resolver = build_resolver(&config)?;
            let cancel = cancel_on_ctrl_c();
            let result = resolver.resolve_metadata(&args.to_item(), &cancel).await?;
            print_json(&result)
        }
        Command::Images(args) => {
            let resolver = build_resolver(&config)?;
            let cancel = cancel_on_ctrl_c();
            let images = resolver.resolve_images(&args.to_item(), &cancel).await?;
            print_json(&images)
        }
    }
}

/// Config file values with command line overrides applied.
fn load_config(cli: &Cli) -> Result<ResolverConfig, CliError> {
    let manager = ConfigManager::open(cli.config.clone())?;
    debug!("Using config {}", manager.path().display());

    let mut config = manager.config().clone();
    if let Some(api_key) = &cli.api_key {
        config = config.with_api_key(api_key.clone());
    }
    if let Some(cache_root) = &cli.cache_root {
        config = config.with_cache_root(cache_root.clone());
    }
    if cli.no_delay {
        config = config.with_fetch_delay_secs(0);
    }
    Ok(config)
}

fn build_cache(config: &ResolverConfig) -> Result<Arc<MetadataCache>, CliError> {
    let fetcher = Arc::new(YouTubeApiFetcher::from_config(config)?);
    Ok(Arc::new(MetadataCache::from_config(config, fetcher)))
}

fn build_resolver(config: &ResolverConfig) -> Result<MetadataResolver, CliError> {
    config.validate()?;
    Ok(MetadataResolver::new(build_cache(config)?))
}

fn identify(name: &str, config: &ResolverConfig) -> Result<(), CliError> {
    let id = extract_identifier(name).ok_or_else(|| CliError::NoIdentifier(name.to_string()))?;
    let cache = build_cache(config)?;

    print_json(&IdReport {
        class: id.class(),
        collection_entity: EntityKind::for_item(ItemKind::Series, id.class()),
        cache: cache.status(&id),
        record_path: cache.record_path(&id).ok(),
        identifier: id.as_str().to_string(),
    })
}

/// Token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            trigger.cancel();
        }
    });
    cancel
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
