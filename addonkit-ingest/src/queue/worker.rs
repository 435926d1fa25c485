//! Background worker that drains the ingestion queue

use super::{IngestSummary, Submission, WorkItem};
use crate::addon_manager::{self, AddonManager, SharedAddonManager};
use crate::executor::{run_and_wait, UiExecutor};
use crate::models::{Drawable, DrawableSlot};
use crate::services::alt_variation_resolver::hides_hair;
use crate::services::asset_store::AssetStore;
use crate::services::group_extractor::extract_group;
use crate::services::metadata_enricher::{enrich, OccurrenceCounter};
use crate::services::pattern_classifier::{FileRole, PatternClassifier};
use crate::services::type_resolver::{ResolvedType, TypeResolver};
use crate::services::variant_linker::{link_companion, CompanionKind, LinkContext, LinkOutcome, PendingBatch};
use addonkit_common::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub(super) struct Worker {
    batch_size: usize,
    manager: SharedAddonManager,
    executor: Arc<dyn UiExecutor>,
    resolver: Arc<dyn TypeResolver>,
    store: AssetStore,
    classifier: PatternClassifier,
    pending: PendingBatch,
    occurrences: OccurrenceCounter,
    summary: IngestSummary,
}

impl Worker {
    pub(super) fn new(
        batch_size: usize,
        manager: SharedAddonManager,
        executor: Arc<dyn UiExecutor>,
        resolver: Arc<dyn TypeResolver>,
        store: AssetStore,
    ) -> Self {
        Self {
            batch_size: batch_size.max(1),
            manager,
            executor,
            resolver,
            store,
            classifier: PatternClassifier::new(),
            pending: PendingBatch::default(),
            occurrences: OccurrenceCounter::default(),
            summary: IngestSummary::default(),
        }
    }

    pub(super) async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<WorkItem>) {
        info!("Ingestion worker started");

        while let Some(item) = receiver.recv().await {
            match item {
                WorkItem::Submission(submission) => self.process(submission).await,
                WorkItem::Completion(done) => self.complete(done).await,
            }
        }

        // Channel closed: commit whatever was still staged
        self.flush().await;
        info!("Ingestion worker shutting down");
    }

    /// Handle one file: resolve, then link, skip or stage it
    async fn process(&mut self, submission: Submission) {
        let Some(resolved) = self.resolve(&submission.file_path).await else {
            debug!(file = %submission.file_path.display(), "Unresolvable file type, skipping");
            self.summary.unresolved += 1;
            return;
        };

        if let Err(e) = self.with_manager(AddonManager::ensure_addon).await {
            error!(error = %e, "Failed to prepare addon collection");
        }

        let slot = DrawableSlot {
            sex: submission.sex,
            is_prop: resolved.is_prop,
            category: resolved.category,
        };

        match self.classifier.classify(&submission.file_path) {
            FileRole::Alternate => {
                debug!(file = %submission.file_path.display(), "Skipping alternate variant file");
                self.summary.skipped += 1;
            }
            FileRole::FirstPerson => {
                self.link(&submission.file_path, CompanionKind::FirstPerson, slot)
                    .await
            }
            FileRole::Physics => {
                self.link(&submission.file_path, CompanionKind::Physics, slot)
                    .await
            }
            FileRole::Base => {
                self.stage(submission, resolved).await;
                if self.pending.len() >= self.batch_size {
                    self.flush().await;
                }
            }
        }
    }

    async fn resolve(&self, file_path: &Path) -> Option<ResolvedType> {
        let resolver = Arc::clone(&self.resolver);
        let path = file_path.to_path_buf();
        match tokio::task::spawn_blocking(move || resolver.resolve(&path)).await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(file = %file_path.display(), error = %e, "Type resolver panicked");
                None
            }
        }
    }

    async fn link(&mut self, file_path: &Path, kind: CompanionKind, slot: DrawableSlot) {
        let suffix = self.classifier.drawable_number(file_path);
        let ctx = LinkContext {
            manager: &self.manager,
            executor: self.executor.as_ref(),
            store: &self.store,
        };

        match link_companion(&ctx, &mut self.pending, file_path, kind, slot, suffix).await {
            LinkOutcome::Linked { drawable, copied, .. } => {
                debug!(file = %file_path.display(), drawable = %drawable, copied, "Linked companion file");
                self.summary.linked += 1;
            }
            LinkOutcome::Unmatched => self.summary.unlinked += 1,
        }
    }

    /// Build a drawable for a base file and add it to the pending batch
    async fn stage(&mut self, submission: Submission, resolved: ResolvedType) {
        let source_number = self.classifier.drawable_number(&submission.file_path);
        let mut drawable = Drawable::new(
            submission.file_path.clone(),
            submission.sex,
            resolved.is_prop,
            resolved.category,
        );

        if let Some(base_path) = &submission.base_path {
            if let Some(group) = extract_group(&submission.file_path, base_path, submission.sex) {
                let label = group.clone();
                if let Err(e) = self.with_manager(move |m| m.add_group(&label)).await {
                    error!(group = %group, error = %e, "Failed to record group");
                }
                drawable.group = Some(group);
            }
        }

        let occurrence = submission.tables.as_deref().map(|tables| {
            let occurrence = self.occurrences.next(resolved.category, resolved.is_prop);
            if !enrich(&mut drawable, tables, occurrence) {
                debug!(file = %submission.file_path.display(), occurrence, "No definition record for drawable");
            }
            occurrence
        });

        if let Some(variations) = &submission.alt_variations {
            if let Some(number) = source_number.or(occurrence) {
                drawable.hides_hair = hides_hair(variations, &drawable, number);
            }
        }

        self.pending.push(drawable, source_number);
    }

    /// Commit staged drawables in order and renumber
    async fn flush(&mut self) {
        let drawables = self.pending.take_drawables();
        if drawables.is_empty() {
            return;
        }
        let count = drawables.len();

        let committed = self
            .with_manager(move |m| {
                for drawable in drawables {
                    m.accept(drawable);
                }
                m.normalize_all();
            })
            .await;

        match committed {
            Ok(()) => {
                self.summary.accepted += count;
                info!(count, "Committed drawable batch");
            }
            Err(e) => error!(count, error = %e, "Failed to commit drawable batch"),
        }
    }

    async fn complete(&mut self, done: tokio::sync::oneshot::Sender<IngestSummary>) {
        self.flush().await;
        self.pending.clear();
        self.occurrences.reset();

        let summary = std::mem::take(&mut self.summary);
        info!(
            accepted = summary.accepted,
            linked = summary.linked,
            skipped = summary.skipped,
            unresolved = summary.unresolved,
            unlinked = summary.unlinked,
            "Ingestion batch complete"
        );
        // Submitter may have stopped waiting; the batch is applied either way
        let _ = done.send(summary);
    }

    /// Run a mutation of the addon manager on the executor and wait for it
    async fn with_manager<R, F>(&self, action: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut AddonManager) -> R + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        run_and_wait(self.executor.as_ref(), move || -> Result<R> {
            let mut guard = addon_manager::lock(&manager)?;
            Ok(action(&mut guard))
        })
        .await?
    }
}
