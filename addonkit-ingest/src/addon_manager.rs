//! Addon distribution
//!
//! Owns the ordered addon collection and keeps its numbering invariants:
//!
//! - an addon never holds more than `capacity` drawables of one slot
//!   (category, prop flag, sex)
//! - numbers of drawables sharing a slot inside one addon are `0..n` with no gaps
//!
//! Every mutation goes through `&mut self`; shared access is serialized by the
//! [`SharedAddonManager`] mutex, which both the ingestion worker and direct
//! callers take.

use crate::models::{Addon, Drawable, DrawableSlot};
use crate::services::asset_store::AssetStore;
use crate::services::duplicate_registry::{DuplicateGroup, DuplicateRegistry};
use addonkit_common::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Addon manager shared between the ingestion worker and direct callers
pub type SharedAddonManager = Arc<Mutex<AddonManager>>;

/// Lock a shared manager
pub fn lock(manager: &SharedAddonManager) -> Result<MutexGuard<'_, AddonManager>> {
    manager
        .lock()
        .map_err(|_| Error::Internal("Addon manager lock poisoned".to_string()))
}

/// Where an accepted drawable landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub addon_index: usize,
    pub number: u32,
}

/// Session-owned addon collection
pub struct AddonManager {
    pub project_name: String,
    addons: Vec<Addon>,
    groups: Vec<String>,
    tags: Vec<String>,
    /// Fingerprints of duplicate groups the user chose to keep
    ignored_duplicates: Vec<String>,
    capacity: usize,
    auto_delete_files: bool,
    dirty: bool,
    registry: Arc<dyn DuplicateRegistry>,
    store: AssetStore,
}

impl AddonManager {
    pub fn new(registry: Arc<dyn DuplicateRegistry>, store: AssetStore, capacity: usize) -> Self {
        Self {
            project_name: String::new(),
            addons: Vec::new(),
            groups: Vec::new(),
            tags: Vec::new(),
            ignored_duplicates: Vec::new(),
            capacity,
            auto_delete_files: false,
            dirty: false,
            registry,
            store,
        }
    }

    /// Delete managed asset files together with their drawables
    pub fn with_auto_delete_files(mut self, enabled: bool) -> Self {
        self.auto_delete_files = enabled;
        self
    }

    pub fn into_shared(self) -> SharedAddonManager {
        Arc::new(Mutex::new(self))
    }

    pub fn addons(&self) -> &[Addon] {
        &self.addons
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Unsaved changes since the last [`mark_saved`](Self::mark_saved)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn total_drawables(&self) -> usize {
        self.addons.iter().map(|a| a.drawables.len()).sum()
    }

    /// Duplicate groups still awaiting review
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        let mut groups = self.registry.duplicate_groups();
        groups.retain(|g| !self.ignored_duplicates.contains(&g.fingerprint));
        groups
    }

    pub fn ignored_duplicate_groups(&self) -> &[String] {
        &self.ignored_duplicates
    }

    /// Hide a duplicate group by fingerprint
    pub fn ignore_duplicate_group(&mut self, fingerprint: &str) -> bool {
        if self.ignored_duplicates.iter().any(|f| f == fingerprint) {
            return false;
        }
        self.ignored_duplicates.push(fingerprint.to_string());
        self.dirty = true;
        true
    }

    /// Show an ignored duplicate group again
    pub fn unignore_duplicate_group(&mut self, fingerprint: &str) -> bool {
        let before = self.ignored_duplicates.len();
        self.ignored_duplicates.retain(|f| f != fingerprint);
        let removed = self.ignored_duplicates.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Append an empty addon named after its position
    pub fn create_addon(&mut self) -> usize {
        let index = self.addons.len();
        self.addons.push(Addon::new(addon_name(index)));
        index
    }

    /// Make sure at least one addon exists
    pub fn ensure_addon(&mut self) {
        if self.addons.is_empty() {
            self.create_addon();
        }
    }

    /// Record a group label, keeping discovery order
    pub fn add_group(&mut self, group: &str) -> bool {
        if self.groups.iter().any(|g| g == group) {
            return false;
        }
        self.groups.push(group.to_string());
        true
    }

    /// Record a project tag, keeping insertion order
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.dirty = true;
        true
    }

    /// Index of the addon holding a drawable
    pub fn find_owner(&self, id: Uuid) -> Option<usize> {
        self.addons.iter().position(|a| a.contains(id))
    }

    pub fn get(&self, id: Uuid) -> Option<&Drawable> {
        self.addons.iter().find_map(|a| a.get(id))
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Drawable> {
        self.addons.iter_mut().find_map(|a| a.get_mut(id))
    }

    /// All committed drawables of a slot, across addons, in collection order
    pub fn drawables_in_slot(&self, slot: DrawableSlot) -> impl Iterator<Item = &Drawable> {
        self.addons
            .iter()
            .flat_map(|a| a.drawables.iter())
            .filter(move |d| d.slot() == slot)
    }

    /// Commit a drawable to the first addon with room for its slot
    ///
    /// **Algorithm:**
    /// 1. Scan addons in order, counting drawables sharing the slot
    /// 2. First addon below capacity: number = that count, append, stop
    /// 3. All full: append a new addon and use number 0
    ///
    /// The drawable is then registered for duplicate detection and the
    /// session is marked dirty.
    pub fn accept(&mut self, mut drawable: Drawable) -> Placement {
        let slot = drawable.slot();
        let free = self
            .addons
            .iter()
            .enumerate()
            .map(|(i, a)| (i, a.count_in_slot(slot)))
            .find(|(_, count)| *count < self.capacity);

        let (addon_index, number) = match free {
            Some((index, count)) => (index, count as u32),
            None => {
                let index = self.create_addon();
                info!(addon = %self.addons[index].name, "Created overflow addon");
                (index, 0)
            }
        };

        drawable.is_new = true;
        drawable.number = number;
        drawable.set_name();

        debug!(
            drawable = %drawable.name,
            addon = %self.addons[addon_index].name,
            "Accepted drawable"
        );

        self.registry.register(&drawable);
        self.addons[addon_index].drawables.push(drawable);
        self.dirty = true;

        Placement {
            addon_index,
            number,
        }
    }

    /// Move a drawable into another addon
    ///
    /// The drawable gets the next free number of its slot in the target
    /// (the target's current count). The source addon is renumbered to close
    /// the gap. Errors:
    /// - `MissingArgument("drawable")` when no addon holds `drawable_id`
    /// - `MissingArgument("target_addon")` when the target does not exist
    /// - `CapacityExceeded` when the target is full for the slot
    pub fn move_drawable(&mut self, drawable_id: Uuid, target_addon: usize) -> Result<u32> {
        let source = self
            .find_owner(drawable_id)
            .ok_or(Error::MissingArgument("drawable"))?;
        if target_addon >= self.addons.len() {
            return Err(Error::MissingArgument("target_addon"));
        }
        if source == target_addon {
            return self
                .get(drawable_id)
                .map(|d| d.number)
                .ok_or(Error::MissingArgument("drawable"));
        }

        let slot = self.addons[source]
            .get(drawable_id)
            .map(Drawable::slot)
            .ok_or(Error::MissingArgument("drawable"))?;
        let count = self.addons[target_addon].count_in_slot(slot);
        if count >= self.capacity {
            return Err(Error::CapacityExceeded {
                addon: self.addons[target_addon].name.clone(),
                capacity: self.capacity,
            });
        }

        let mut drawable = self.addons[source]
            .remove(drawable_id)
            .ok_or(Error::MissingArgument("drawable"))?;
        self.addons[source].normalize();

        drawable.number = count as u32;
        drawable.set_name();
        let number = drawable.number;
        self.addons[target_addon].drawables.push(drawable);
        self.dirty = true;

        Ok(number)
    }

    /// Delete drawables, dropping addons that become empty
    ///
    /// An addon emptied by the deletion is removed while more than one addon
    /// remains, and the remaining addons are renamed `Addon 1..n`. The last
    /// addon is always kept. Otherwise the owner is renumbered.
    ///
    /// Returns the number of drawables actually removed.
    pub fn delete_drawables(&mut self, ids: &[Uuid]) -> usize {
        self.dirty = true;
        let mut removed = 0;

        for &id in ids {
            let Some(owner) = self.find_owner(id) else {
                warn!(drawable = %id, "Tried to delete drawable but it was not found in any addon");
                continue;
            };
            let Some(drawable) = self.addons[owner].remove(id) else {
                continue;
            };
            removed += 1;
            self.registry.unregister(&drawable);

            if self.auto_delete_files {
                self.delete_files(&drawable);
            }

            if self.addons[owner].drawables.is_empty() {
                if self.addons.len() > 1 {
                    self.addons.remove(owner);
                    self.adjust_addon_names();
                }
            } else {
                self.addons[owner].normalize();
            }
        }

        removed
    }

    /// Restore contiguous numbering in every addon
    pub fn normalize_all(&mut self) {
        for addon in &mut self.addons {
            addon.normalize();
        }
    }

    fn delete_files(&self, drawable: &Drawable) {
        let paths = std::iter::once(&drawable.file_path)
            .chain(drawable.first_person_path.iter())
            .chain(drawable.physics_path.iter());

        for path in paths {
            if let Err(e) = self.store.remove(path) {
                warn!(
                    drawable = %drawable.name,
                    error = %e,
                    "Failed to delete files for drawable"
                );
            }
        }
    }

    fn adjust_addon_names(&mut self) {
        for (i, addon) in self.addons.iter_mut().enumerate() {
            addon.name = addon_name(i);
        }
    }
}

fn addon_name(index: usize) -> String {
    format!("Addon {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;

    struct NoopRegistry;

    impl DuplicateRegistry for NoopRegistry {
        fn register(&self, _: &Drawable) {}
        fn unregister(&self, _: &Drawable) {}
    }

    /// Reports the same groups regardless of registrations
    struct FixedGroups(Vec<DuplicateGroup>);

    impl DuplicateRegistry for FixedGroups {
        fn register(&self, _: &Drawable) {}
        fn unregister(&self, _: &Drawable) {}

        fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
            self.0.clone()
        }
    }

    fn group(fingerprint: &str) -> DuplicateGroup {
        DuplicateGroup {
            fingerprint: fingerprint.to_string(),
            drawables: vec![Uuid::new_v4(), Uuid::new_v4()],
        }
    }

    fn manager(capacity: usize) -> AddonManager {
        AddonManager::new(Arc::new(NoopRegistry), AssetStore::new("assets"), capacity)
    }

    fn jbib() -> Drawable {
        Drawable::new("jbib_000_u.ydd", Sex::Male, false, 11)
    }

    #[test]
    fn test_accept_fills_then_overflows() {
        let mut m = manager(2);
        let placements: Vec<Placement> = (0..5).map(|_| m.accept(jbib())).collect();

        assert_eq!(
            placements.iter().map(|p| (p.addon_index, p.number)).collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)]
        );
        let names: Vec<&str> = m.addons().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Addon 1", "Addon 2", "Addon 3"]);
        assert!(m.is_dirty());
    }

    #[test]
    fn test_slots_count_independently() {
        let mut m = manager(1);
        m.accept(jbib());
        let prop = m.accept(Drawable::new("p_head_000.ydd", Sex::Male, true, 11));
        let female = m.accept(Drawable::new("jbib_000_u.ydd", Sex::Female, false, 11));

        assert_eq!(prop, Placement { addon_index: 0, number: 0 });
        assert_eq!(female, Placement { addon_index: 0, number: 0 });
        assert_eq!(m.addons().len(), 1);
    }

    #[test]
    fn test_accept_marks_new_and_names() {
        let mut m = manager(8);
        m.accept(jbib());
        m.accept(jbib());
        let second = &m.addons()[0].drawables[1];
        assert!(second.is_new);
        assert_eq!(second.name, "jbib_001");
    }

    #[test]
    fn test_freed_slot_in_earlier_addon_is_reused() {
        let mut m = manager(2);
        let ids: Vec<Uuid> = (0..3)
            .map(|_| {
                let d = jbib();
                let id = d.id;
                m.accept(d);
                id
            })
            .collect();

        m.delete_drawables(&ids[..1]);
        let placement = m.accept(jbib());
        assert_eq!(placement, Placement { addon_index: 0, number: 1 });
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        let mut m = manager(2);
        let d = jbib();
        let id = d.id;
        m.accept(d);

        assert!(matches!(
            m.move_drawable(Uuid::new_v4(), 0),
            Err(Error::MissingArgument("drawable"))
        ));
        assert!(matches!(
            m.move_drawable(id, 9),
            Err(Error::MissingArgument("target_addon"))
        ));
    }

    #[test]
    fn test_add_group_deduplicates() {
        let mut m = manager(2);
        assert!(m.add_group("tops"));
        assert!(!m.add_group("tops"));
        assert!(m.add_group("hats"));
        assert_eq!(m.groups(), &["tops".to_string(), "hats".to_string()]);
    }

    #[test]
    fn test_ignored_duplicate_groups_are_filtered() {
        // Given: two duplicate groups and a saved session
        let registry = FixedGroups(vec![group("aa11"), group("bb22")]);
        let mut m = AddonManager::new(Arc::new(registry), AssetStore::new("assets"), 2);
        m.mark_saved();
        assert!(!m.is_dirty());

        // When: one group is ignored, twice
        assert!(m.ignore_duplicate_group("aa11"));
        assert!(!m.ignore_duplicate_group("aa11"));

        // Then: only the other group is reported and the session is unsaved
        let fingerprints: Vec<String> = m.duplicate_groups().into_iter().map(|g| g.fingerprint).collect();
        assert_eq!(fingerprints, vec!["bb22".to_string()]);
        assert_eq!(m.ignored_duplicate_groups(), &["aa11".to_string()]);
        assert!(m.is_dirty());
    }

    #[test]
    fn test_unignore_restores_group() {
        let registry = FixedGroups(vec![group("aa11")]);
        let mut m = AddonManager::new(Arc::new(registry), AssetStore::new("assets"), 2);
        m.ignore_duplicate_group("aa11");
        m.mark_saved();

        assert!(!m.unignore_duplicate_group("cc33"));
        assert!(!m.is_dirty());
        assert!(m.unignore_duplicate_group("aa11"));
        assert!(m.is_dirty());
        assert_eq!(m.duplicate_groups().len(), 1);
        assert!(m.ignored_duplicate_groups().is_empty());
    }

    #[test]
    fn test_add_tag_deduplicates_and_marks_unsaved() {
        let mut m = manager(2);
        assert!(m.add_tag("winter"));
        m.mark_saved();

        assert!(!m.add_tag("winter"));
        assert!(!m.is_dirty());
        assert!(m.add_tag("streetwear"));
        assert!(m.is_dirty());
        assert_eq!(m.tags(), &["winter".to_string(), "streetwear".to_string()]);
    }
}
