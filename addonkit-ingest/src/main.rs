//! addonkit-ingest - command-line drawable importer
//!
//! **Usage:**
//! ```bash
//! addonkit-ingest import <files>... --sex female [--base <dir>] [--definition <json>] [--alt <meta>] [--tag <tag>]...
//! addonkit-ingest load <addon.meta>
//! ```
//!
//! Prints the resulting addon collection as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use addonkit_common::config::load_config;
use addonkit_common::logging::init_tracing;
use addonkit_ingest::models::{Addon, Sex};
use addonkit_ingest::services::{
    AssetStore, DuplicateGroup, FilenameTypeResolver, FingerprintRegistry, JsonDefinitionLoader,
};
use addonkit_ingest::{addon_manager, AddonManager, ChannelExecutor, ImportContext, IngestQueue};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

/// Command-line arguments for addonkit-ingest
#[derive(Parser, Debug)]
#[command(name = "addonkit-ingest")]
#[command(about = "Organize drawable files into addons")]
#[command(version)]
struct Args {
    /// Configuration file (overrides ADDONKIT_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import loose drawable files
    Import {
        /// Drawable, first-person and physics files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Character sex the files belong to
        #[arg(short, long, default_value = "male")]
        sex: Sex,

        /// Import root used to derive group labels
        #[arg(short, long)]
        base: Option<PathBuf>,

        /// Character definition exported as JSON
        #[arg(short, long)]
        definition: Option<PathBuf>,

        /// pedalternativevariations .meta file
        #[arg(short, long)]
        alt: Option<PathBuf>,

        /// Project tag, repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Load an exported addon from its .meta file
    Load {
        meta: PathBuf,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    project_name: &'a str,
    groups: &'a [String],
    tags: &'a [String],
    addons: &'a [Addon],
    duplicates: Vec<DuplicateGroup>,
    ignored_duplicates: &'a [String],
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read first for its logging section; its outcome is logged
    // once the subscriber exists
    let (config, config_outcome) = load_config(args.config.as_deref());
    init_tracing(&config.logging).context("Failed to initialize logging")?;
    config_outcome.log();

    info!("Starting addonkit-ingest");
    info!("Assets directory: {}", config.assets_dir.display());

    let store = AssetStore::new(config.assets_dir.clone());
    let manager = AddonManager::new(
        Arc::new(FingerprintRegistry::new()),
        store.clone(),
        config.max_drawables_per_addon,
    )
    .with_auto_delete_files(config.auto_delete_files)
    .into_shared();

    let executor = ChannelExecutor::spawn("addon-writer").context("Failed to start executor")?;
    let queue = IngestQueue::new(
        &config,
        manager.clone(),
        Arc::new(executor),
        Arc::new(FilenameTypeResolver),
        store,
    );

    let signal = match args.command {
        Command::Import {
            files,
            sex,
            base,
            definition,
            alt,
            tags,
        } => {
            {
                let mut manager = addon_manager::lock(queue.manager())?;
                for tag in &tags {
                    manager.add_tag(tag);
                }
            }
            let context = ImportContext::load(
                base,
                definition.as_deref(),
                alt.as_deref(),
                &JsonDefinitionLoader,
            );
            queue.submit(files, sex, context)?
        }
        Command::Load { meta } => queue
            .load_addon(&meta, &JsonDefinitionLoader)
            .with_context(|| format!("Failed to load addon {}", meta.display()))?,
    };

    let summary = signal.wait().await?;
    queue.shutdown().await;
    info!(
        accepted = summary.accepted,
        linked = summary.linked,
        "Import finished"
    );

    let manager = addon_manager::lock(&manager)?;
    let report = Report {
        project_name: &manager.project_name,
        groups: manager.groups(),
        tags: manager.tags(),
        addons: manager.addons(),
        duplicates: manager.duplicate_groups(),
        ignored_duplicates: manager.ignored_duplicate_groups(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
