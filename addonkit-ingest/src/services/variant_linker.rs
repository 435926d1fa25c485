//! Companion file linking
//!
//! First-person variants and cloth physics files are not items of their own.
//! They attach to the base drawable of the same slot whose number equals the
//! companion's filename suffix. The base may already be committed to an addon
//! or may still be waiting in the current batch.

use crate::addon_manager::{self, SharedAddonManager};
use crate::executor::{run_and_wait, UiExecutor};
use crate::models::{Drawable, DrawableSlot};
use crate::services::asset_store::AssetStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Kind of companion file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionKind {
    FirstPerson,
    Physics,
}

impl CompanionKind {
    fn stem_suffix(self) -> &'static str {
        match self {
            CompanionKind::FirstPerson => "firstperson",
            CompanionKind::Physics => "cloth",
        }
    }

    fn missing_base_message(self) -> &'static str {
        match self {
            CompanionKind::FirstPerson => "Could not find associated YDD file for first person file",
            CompanionKind::Physics => "Could not find associated YDD file for this YLD",
        }
    }

    fn apply(self, drawable: &mut Drawable, path: PathBuf) {
        match self {
            CompanionKind::FirstPerson => drawable.first_person_path = Some(path),
            CompanionKind::Physics => drawable.physics_path = Some(path),
        }
    }
}

/// Drawables of the batch in flight, plus their filename numbers
///
/// Source numbers stay indexed until the batch's completion marker, also for
/// drawables already flushed to an addon, so a companion arriving after an
/// intermediate flush still finds its base.
#[derive(Debug, Default)]
pub struct PendingBatch {
    drawables: Vec<Drawable>,
    source_numbers: HashMap<Uuid, u32>,
}

impl PendingBatch {
    pub fn push(&mut self, drawable: Drawable, source_number: Option<u32>) {
        if let Some(number) = source_number {
            self.source_numbers.insert(drawable.id, number);
        }
        self.drawables.push(drawable);
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Take the uncommitted drawables for a flush, keeping the number index
    pub fn take_drawables(&mut self) -> Vec<Drawable> {
        std::mem::take(&mut self.drawables)
    }

    /// End of batch: forget everything
    pub fn clear(&mut self) {
        self.drawables.clear();
        self.source_numbers.clear();
    }

    fn find_uncommitted(&mut self, slot: DrawableSlot, number: u32) -> Option<&mut Drawable> {
        let numbers = &self.source_numbers;
        self.drawables
            .iter_mut()
            .find(|d| d.slot() == slot && numbers.get(&d.id) == Some(&number))
    }

    fn ids_with_source_number(&self, number: u32) -> Vec<Uuid> {
        self.source_numbers
            .iter()
            .filter(|(_, n)| **n == number)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Shared collaborators the linker needs
pub struct LinkContext<'a> {
    pub manager: &'a SharedAddonManager,
    pub executor: &'a dyn UiExecutor,
    pub store: &'a AssetStore,
}

/// Result of linking one companion file
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// Path recorded on the base drawable
    Linked {
        drawable: Uuid,
        path: PathBuf,
        /// False when the copy failed and the external path was kept
        copied: bool,
    },
    /// No base drawable matched; nothing was mutated
    Unmatched,
}

enum Target {
    Uncommitted,
    Committed(Uuid),
}

/// Attach a companion file to its base drawable
///
/// **Search order:**
/// 1. Committed drawables of the slot whose number equals `suffix`
/// 2. Uncommitted drawables of this batch whose source number equals `suffix`
/// 3. Drawables flushed earlier in this batch whose source number equals `suffix`
///
/// The file is copied into managed storage as `{id}_firstperson` or
/// `{id}_cloth`. A failed copy records the original path instead.
pub async fn link_companion(
    ctx: &LinkContext<'_>,
    pending: &mut PendingBatch,
    file_path: &Path,
    kind: CompanionKind,
    slot: DrawableSlot,
    suffix: Option<u32>,
) -> LinkOutcome {
    let Some(number) = suffix else {
        warn!("{}: {}, please do it manually", kind.missing_base_message(), file_path.display());
        return LinkOutcome::Unmatched;
    };

    let mut target = find_committed_by_number(ctx, slot, number)
        .await
        .map(|id| (id, Target::Committed(id)));
    if target.is_none() {
        target = pending
            .find_uncommitted(slot, number)
            .map(|d| (d.id, Target::Uncommitted));
    }
    if target.is_none() {
        let candidates = pending.ids_with_source_number(number);
        target = find_flushed_by_source(ctx, slot, candidates)
            .await
            .map(|id| (id, Target::Committed(id)));
    }

    let Some((drawable_id, target)) = target else {
        warn!("{}: {}, please do it manually", kind.missing_base_message(), file_path.display());
        return LinkOutcome::Unmatched;
    };

    let stem = format!("{}_{}", drawable_id, kind.stem_suffix());
    let (path, copied) = match ctx.store.copy_with_replace(file_path, &stem).await {
        Ok(relative) => (relative, true),
        Err(e) => {
            warn!(
                "Failed to copy {} file to project assets: {}. Using original path.",
                kind.stem_suffix(),
                e
            );
            (file_path.to_path_buf(), false)
        }
    };

    match target {
        Target::Uncommitted => {
            if let Some(d) = pending.find_uncommitted(slot, number) {
                kind.apply(d, path.clone());
            }
        }
        Target::Committed(id) => {
            let manager = ctx.manager.clone();
            let recorded = path.clone();
            let applied = run_and_wait(ctx.executor, move || -> addonkit_common::Result<()> {
                let mut guard = addon_manager::lock(&manager)?;
                if let Some(d) = guard.get_mut(id) {
                    kind.apply(d, recorded);
                }
                Ok(())
            })
            .await;
            if let Err(e) = applied.and_then(|r| r) {
                tracing::error!(drawable = %id, error = %e, "Failed to record companion path");
            }
        }
    }

    LinkOutcome::Linked {
        drawable: drawable_id,
        path,
        copied,
    }
}

async fn find_committed_by_number(
    ctx: &LinkContext<'_>,
    slot: DrawableSlot,
    number: u32,
) -> Option<Uuid> {
    let manager = ctx.manager.clone();
    let found = run_and_wait(ctx.executor, move || -> addonkit_common::Result<Option<Uuid>> {
        let guard = addon_manager::lock(&manager)?;
        let id = guard
            .drawables_in_slot(slot)
            .find(|d| d.number == number)
            .map(|d| d.id);
        Ok(id)
    })
    .await;
    logged_lookup(found.and_then(|r| r))
}

async fn find_flushed_by_source(
    ctx: &LinkContext<'_>,
    slot: DrawableSlot,
    candidates: Vec<Uuid>,
) -> Option<Uuid> {
    if candidates.is_empty() {
        return None;
    }
    let manager = ctx.manager.clone();
    let found = run_and_wait(ctx.executor, move || -> addonkit_common::Result<Option<Uuid>> {
        let guard = addon_manager::lock(&manager)?;
        let id = candidates
            .into_iter()
            .find(|id| guard.get(*id).is_some_and(|d| d.slot() == slot));
        Ok(id)
    })
    .await;
    logged_lookup(found.and_then(|r| r))
}

/// A failed lookup counts as no match, after reporting why
fn logged_lookup(found: addonkit_common::Result<Option<Uuid>>) -> Option<Uuid> {
    match found {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to search addon collection for base drawable");
            None
        }
    }
}
