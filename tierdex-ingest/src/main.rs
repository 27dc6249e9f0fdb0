//! tierdex-ingest - catalog refresh tool
//!
//! Subcommands:
//! - `sync`: fetch the remote catalog, cache images, merge and persist
//! - `seed`: import curated content from a JSON file
//! - `tiers` / `rank`: print the two tier projections of the stored catalog

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tierdex_common::config::{CONFIG_PATH_ENV, ROOT_FOLDER_ENV};
use tierdex_common::model::{CharacterRecord, OVERALL};
use tierdex_common::projection::{self, DEFAULT_TOP_N};
use tierdex_common::Catalog;
use tierdex_ingest::seed::seed_catalog;
use tierdex_ingest::IngestSettings;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for tierdex-ingest
#[derive(Parser, Debug)]
#[command(name = "tierdex-ingest")]
#[command(about = "Refresh the character tier-list catalog from the remote database")]
#[command(version)]
struct Args {
    /// Project root folder (storage paths resolve against it)
    #[arg(short, long, global = true, env = ROOT_FOLDER_ENV)]
    root_folder: Option<PathBuf>,

    /// Explicit config file
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, cache assets, reconcile and persist
    Sync {
        /// Reconcile and report without writing the store
        #[arg(long)]
        dry_run: bool,

        /// Leave the image cache alone
        #[arg(long)]
        skip_assets: bool,

        /// Accept an empty remote catalog even if that empties the store
        #[arg(long)]
        allow_empty: bool,
    },

    /// Apply curated content from a JSON file keyed by slug
    Seed {
        file: PathBuf,
    },

    /// Print the catalog grouped by tier
    Tiers {
        #[arg(long, default_value = OVERALL)]
        mode: String,
    },

    /// Print the catalog ranked by tier
    Rank {
        #[arg(long, default_value = OVERALL)]
        mode: String,

        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        limit: usize,

        /// Emit the ranked records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = IngestSettings::resolve(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to resolve configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.toml.logging.level.clone());
    init_tracing(&level, settings.toml.logging.file.as_deref())?;

    // Config loading ran before the subscriber existed, so report it here
    info!(
        root = %settings.root_folder.display(),
        config = %settings.config_source(),
        catalog = %settings.paths.catalog.display(),
        "tierdex-ingest {}",
        env!("CARGO_PKG_VERSION")
    );

    match args.command {
        Command::Sync {
            dry_run,
            skip_assets,
            allow_empty,
        } => {
            let mut config = settings.pipeline_config(dry_run, skip_assets);
            config.allow_empty = allow_empty;
            let pipeline = settings
                .build_pipeline(config)
                .context("Failed to set up sync pipeline")?;
            let report = pipeline
                .run(tierdex_common::time::today())
                .await
                .context("Sync failed")?;
            println!("{}", report);
        }
        Command::Seed { file } => {
            let report = seed_catalog(&settings.catalog_store(), &file)
                .with_context(|| format!("Seeding from {} failed", file.display()))?;
            println!(
                "seeded: {}, unchanged: {}, unknown: {}",
                report.applied.len(),
                report.unchanged.len(),
                report.unknown.len()
            );
            for slug in &report.unknown {
                println!("  unknown slug: {}", slug);
            }
        }
        Command::Tiers { mode } => {
            let catalog = load_catalog(&settings.paths.catalog)?;
            let view = catalog.group_by_tier(&mode);
            for group in &view.groups {
                println!("{} ({})", group.tier, group.members.len());
                for record in &group.members {
                    println!("  {}", describe(record));
                }
            }
            if !view.unranked.is_empty() {
                println!("unranked ({})", view.unranked.len());
                for record in &view.unranked {
                    println!("  {}", describe(record));
                }
            }
        }
        Command::Rank { mode, limit, json } => {
            let catalog = load_catalog(&settings.paths.catalog)?;
            let ranked = projection::top_n(catalog.all(), &mode, limit);
            if json {
                let out = serde_json::to_string_pretty(&ranked).context("Failed to encode ranking")?;
                println!("{}", out);
            } else {
                for (pos, record) in ranked.iter().enumerate() {
                    println!(
                        "{:>3}. {:<4} {}",
                        pos + 1,
                        projection::tier_value(record, &mode),
                        describe(record)
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| format!("Failed to read catalog {}", path.display()))
}

fn describe(record: &CharacterRecord) -> String {
    format!(
        "{} ({}*, {}, {})",
        record.name, record.rarity, record.path, record.element
    )
}

/// `RUST_LOG` wins; otherwise `level` applies to the tierdex crates
fn init_tracing(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tierdex_ingest={level},tierdex_common={level}"))
    });
    let registry = tracing_subscriber::registry().with(filter);

    match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
                .init();
        }
        None => {
            registry.with(fmt::layer().with_writer(std::io::stderr)).init();
        }
    }

    Ok(())
}
