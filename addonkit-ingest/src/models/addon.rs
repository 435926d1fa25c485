//! Addon: a named, capacity-bounded container of drawables

use super::drawable::{Drawable, DrawableSlot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Ordered collection of drawables exported together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub name: String,
    pub drawables: Vec<Drawable>,
}

impl Addon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            drawables: Vec::new(),
        }
    }

    /// Number of drawables sharing `slot`
    pub fn count_in_slot(&self, slot: DrawableSlot) -> usize {
        self.drawables.iter().filter(|d| d.slot() == slot).count()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.drawables.iter().any(|d| d.id == id)
    }

    pub fn get(&self, id: Uuid) -> Option<&Drawable> {
        self.drawables.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Drawable> {
        self.drawables.iter_mut().find(|d| d.id == id)
    }

    /// Remove a drawable by id, returning it
    pub fn remove(&mut self, id: Uuid) -> Option<Drawable> {
        let index = self.drawables.iter().position(|d| d.id == id)?;
        Some(self.drawables.remove(index))
    }

    /// Restore contiguous numbering for every slot
    ///
    /// Drawables are stably sorted by (sex, prop flag, category, number) and
    /// each slot is renumbered `0..n` in that order, so relative order within
    /// a slot survives and gaps left by removals close up.
    pub fn normalize(&mut self) {
        self.drawables.sort_by_key(|d| (d.slot(), d.number));

        let mut next: HashMap<DrawableSlot, u32> = HashMap::new();
        for drawable in &mut self.drawables {
            let counter = next.entry(drawable.slot()).or_insert(0);
            if drawable.number != *counter {
                drawable.number = *counter;
                drawable.set_name();
            }
            *counter += 1;
        }
    }
}
