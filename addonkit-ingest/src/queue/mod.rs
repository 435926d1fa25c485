//! Ingestion queue
//!
//! Callers submit file lists; one background worker drains them in strict
//! FIFO order. Each submission is followed by a completion marker that
//! resolves only after every file ahead of it has been accepted, linked or
//! skipped.
//!
//! **Ordering:**
//! - A submission and its marker are enqueued under one lock, so batches
//!   from concurrent callers never interleave.
//! - Accepted drawables are committed in submission order, every
//!   `batch_size` drawables and at each marker.

mod worker;

use crate::addon_manager::{self, Placement, SharedAddonManager};
use crate::executor::UiExecutor;
use crate::models::{Drawable, PedAlternativeVariations, PedDefinition, Sex};
use crate::services::addon_scanner;
use crate::services::asset_store::AssetStore;
use crate::services::definition_loader::{load_alt_variations, DefinitionLoader};
use crate::services::metadata_enricher::DefinitionTables;
use crate::services::type_resolver::TypeResolver;
use addonkit_common::config::IngestConfig;
use addonkit_common::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Context shared by every file of one submission
#[derive(Debug, Clone, Default)]
pub struct ImportContext {
    /// Import root used to derive group labels
    pub base_path: Option<PathBuf>,
    pub definition: Option<Arc<PedDefinition>>,
    pub alt_variations: Option<Arc<PedAlternativeVariations>>,
}

impl ImportContext {
    /// Build a context from optional definition and alternate-variation files
    ///
    /// A file that fails to load or decode is logged and left out, so the
    /// import proceeds without its metadata.
    pub fn load(
        base_path: Option<PathBuf>,
        definition: Option<&Path>,
        alt_variations: Option<&Path>,
        loader: &dyn DefinitionLoader,
    ) -> Self {
        let definition = definition.and_then(|path| match loader.load(path) {
            Ok(definition) => Some(Arc::new(definition)),
            Err(e) => {
                warn!(
                    file = %path.display(),
                    error = %e,
                    "Failed to load character definition, continuing without metadata"
                );
                None
            }
        });

        let alt_variations = alt_variations.and_then(|path| match load_alt_variations(path) {
            Ok(variations) => Some(Arc::new(variations)),
            Err(e) => {
                warn!(
                    file = %path.display(),
                    error = %e,
                    "Failed to load alternate variations, continuing without them"
                );
                None
            }
        });

        Self {
            base_path,
            definition,
            alt_variations,
        }
    }
}

/// One file waiting for the worker
#[derive(Debug, Clone)]
pub struct Submission {
    pub file_path: PathBuf,
    pub sex: Sex,
    pub base_path: Option<PathBuf>,
    /// Built once per submit call and shared by its files
    pub tables: Option<Arc<DefinitionTables>>,
    pub alt_variations: Option<Arc<PedAlternativeVariations>>,
}

/// Entry of the work queue
#[derive(Debug)]
pub enum WorkItem {
    Submission(Submission),
    Completion(oneshot::Sender<IngestSummary>),
}

/// What happened to the files of one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Base drawables committed to an addon
    pub accepted: usize,
    /// Companion files attached to a base drawable
    pub linked: usize,
    /// Alternate variant files ignored
    pub skipped: usize,
    /// Files the type resolver could not classify
    pub unresolved: usize,
    /// Companion files without a matching base drawable
    pub unlinked: usize,
}

/// Resolves once the worker has processed a submission's marker
#[derive(Debug)]
pub struct CompletionSignal {
    receiver: oneshot::Receiver<IngestSummary>,
}

impl CompletionSignal {
    pub async fn wait(self) -> Result<IngestSummary> {
        self.receiver
            .await
            .map_err(|_| Error::Internal("Ingestion worker stopped before completing batch".to_string()))
    }
}

/// Ingestion queue handle
pub struct IngestQueue {
    sender: Mutex<mpsc::UnboundedSender<WorkItem>>,
    worker_handle: tokio::task::JoinHandle<()>,
    manager: SharedAddonManager,
}

impl IngestQueue {
    /// Create the queue and spawn its worker on the current tokio runtime
    pub fn new(
        config: &IngestConfig,
        manager: SharedAddonManager,
        executor: Arc<dyn UiExecutor>,
        resolver: Arc<dyn TypeResolver>,
        store: AssetStore,
    ) -> Self {
        info!(batch_size = config.batch_size, "Initializing ingestion queue");

        let (sender, receiver) = mpsc::unbounded_channel::<WorkItem>();
        let worker = worker::Worker::new(
            config.batch_size,
            Arc::clone(&manager),
            executor,
            resolver,
            store,
        );
        let worker_handle = tokio::spawn(worker.run(receiver));

        Self {
            sender: Mutex::new(sender),
            worker_handle,
            manager,
        }
    }

    pub fn manager(&self) -> &SharedAddonManager {
        &self.manager
    }

    /// Queue files for ingestion
    ///
    /// Definition lookup tables are built here, once for the whole list.
    pub fn submit(
        &self,
        file_paths: Vec<PathBuf>,
        sex: Sex,
        context: ImportContext,
    ) -> Result<CompletionSignal> {
        let tables = context
            .definition
            .as_deref()
            .map(|definition| Arc::new(DefinitionTables::build(definition)));
        let (done, receiver) = oneshot::channel();
        let count = file_paths.len();

        let sender = self
            .sender
            .lock()
            .map_err(|_| Error::Internal("Ingestion queue lock poisoned".to_string()))?;
        for file_path in file_paths {
            let item = WorkItem::Submission(Submission {
                file_path,
                sex,
                base_path: context.base_path.clone(),
                tables: tables.clone(),
                alt_variations: context.alt_variations.clone(),
            });
            sender.send(item).map_err(|_| closed())?;
        }
        sender.send(WorkItem::Completion(done)).map_err(|_| closed())?;
        drop(sender);

        info!(files = count, sex = %sex, "Queued files for ingestion");
        Ok(CompletionSignal { receiver })
    }

    /// Commit a drawable directly, bypassing the queue
    pub fn add_drawable(&self, drawable: Drawable) -> Result<Placement> {
        let mut manager = addon_manager::lock(&self.manager)?;
        Ok(manager.accept(drawable))
    }

    /// Discover an exported addon from its `.meta` file and queue its files
    ///
    /// Definition or alternate-variation files that fail to decode are logged
    /// and the addon is ingested without them.
    pub fn load_addon(
        &self,
        meta_path: &Path,
        loader: &dyn DefinitionLoader,
    ) -> Result<CompletionSignal> {
        let files = addon_scanner::discover(meta_path)?;
        addon_manager::lock(&self.manager)?.project_name = files.project_name.clone();

        let context = ImportContext::load(
            Some(files.base_path.clone()),
            Some(files.definition.as_path()),
            files.alt_variations.as_deref(),
            loader,
        );
        self.submit(files.submission_order(), files.sex, context)
    }

    /// Close the queue and wait for the worker to drain it
    pub async fn shutdown(self) {
        // Close the channel to signal the worker to exit
        drop(self.sender);

        if let Err(e) = self.worker_handle.await {
            tracing::error!(error = %e, "Ingestion worker panicked");
        }

        info!("Ingestion queue shut down");
    }
}

fn closed() -> Error {
    Error::Internal("Ingestion queue is closed".to_string())
}
