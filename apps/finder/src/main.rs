mod batch;
mod config;
mod db;
mod errors;
mod import;
mod input;
mod models;
mod probe;
mod providers;
mod report;
mod resolver;
mod slug;
mod store;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ResolverConfig};
use crate::db::{create_pool, ensure_schema};
use crate::errors::AppError;
use crate::probe::{Prober, ReqwestFetcher};
use crate::report::Tally;
use crate::resolver::Resolver;
use crate::store::{MemoryRecordSink, PgRecordSink, RecordSink};

const USAGE: &str =
    "Usage: board-finder resolve <FILE>... | import <FILE>... | validate [--repair]";

#[derive(Parser)]
#[command(name = "board-finder", version)]
#[command(about = "Resolve company names to live Ashby, Lever and Gem job boards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe providers for every company name and record confirmed boards
    Resolve {
        /// Input files, one company name per line (CSV quoting allowed)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Use an in-memory store instead of Postgres
        #[arg(long)]
        dry_run: bool,
        /// Write valid.csv and no-page.txt into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Print every result and the final tally as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store company names as unchecked records without probing
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        dry_run: bool,
        /// Print the import summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-check every unchecked record and mark it active or dead
    Validate {
        /// Search for a board elsewhere when a record's URL is dead
        #[arg(long)]
        repair: bool,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("board_finder={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if matches!(e.downcast_ref::<AppError>(), Some(AppError::Input(_))) {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Resolve {
            files,
            dry_run,
            out_dir,
            json,
        } => {
            // Input problems stop the run before any network or store activity.
            let names = input::load_names(&files)?;
            let resolver_config = config.resolver_config().map_err(AppError::from)?;
            let plan = config.batch_plan().map_err(AppError::from)?;
            let sink = open_sink(&config, dry_run).await?;
            let resolver = build_resolver(resolver_config, sink).await?;

            info!("Resolving {} companies", names.len());
            let results = resolver
                .resolve_all(&names, plan, |batch, done, total| {
                    if json {
                        return;
                    }
                    for r in batch {
                        println!("{}", report::resolution_line(r));
                    }
                    report::print_progress(done, total);
                })
                .await;

            if let Some(dir) = out_dir {
                let (active, dead) = report::resolution_outputs(&results);
                report::write_outputs(&dir, &active, &dead)?;
            }
            let tally = Tally::from_resolutions(&results);
            if json {
                report::print_json(&results, &tally)?;
            } else {
                tally.print();
            }
        }

        Commands::Import {
            files,
            dry_run,
            json,
        } => {
            let names = input::load_names(&files)?;
            let resolver_config = config.resolver_config().map_err(AppError::from)?;
            let sink = open_sink(&config, dry_run).await?;

            info!("Parsed {} companies", names.len());
            let summary = import::import_names(&names, &resolver_config, sink.as_ref())
                .await
                .map_err(AppError::from)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            println!(
                "\nDone! Imported {} companies as 'unchecked' ({} skipped, {} unusable, {} failed).",
                summary.inserted, summary.skipped, summary.unusable, summary.failed
            );
            if summary.inserted > 0 {
                println!("Next step: run \"board-finder validate\" to check URLs");
            }
        }

        Commands::Validate {
            repair,
            out_dir,
            json,
        } => {
            let resolver_config = config.resolver_config().map_err(AppError::from)?;
            let plan = config.batch_plan().map_err(AppError::from)?;
            let sink = open_sink(&config, false).await?;
            let resolver = build_resolver(resolver_config, sink).await?;

            let results = validate::validate_unchecked(&resolver, plan, repair, |batch, done, total| {
                if json {
                    return;
                }
                for v in batch {
                    println!("{}", report::validation_line(v));
                }
                report::print_progress(done, total);
            })
            .await
            .map_err(AppError::from)?;

            if results.is_empty() && !json {
                println!("No unchecked companies found. All companies have been validated.");
                return Ok(());
            }

            if let Some(dir) = out_dir {
                let (active, dead) = report::validation_outputs(&results);
                report::write_outputs(&dir, &active, &dead)?;
            }
            let tally = Tally::from_validations(&results);
            if json {
                report::print_json(&results, &tally)?;
            } else {
                tally.print();
            }
        }
    }

    Ok(())
}

async fn open_sink(config: &Config, dry_run: bool) -> Result<Arc<dyn RecordSink>> {
    if dry_run {
        info!("Dry run: records are kept in memory only");
        return Ok(Arc::new(MemoryRecordSink::new()));
    }

    let pool = create_pool(config.require_database_url()?).await?;
    ensure_schema(&pool).await?;
    Ok(Arc::new(PgRecordSink::new(pool)))
}

async fn build_resolver(config: ResolverConfig, sink: Arc<dyn RecordSink>) -> Result<Resolver> {
    let fetcher = Arc::new(ReqwestFetcher::new(config.timeout)?);
    let prober = Prober::new(fetcher, config.retries, config.timeout, config.backoff);
    let resolver = Resolver::from_sink(config, prober, sink)
        .await
        .map_err(AppError::from)?;
    Ok(resolver)
}
