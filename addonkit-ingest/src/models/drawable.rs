//! Drawable: one importable clothing piece or prop plus its companions

use super::category;
use super::sex::Sex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// The (category, prop flag, sex) triple that capacity and numbering are counted per
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableSlot {
    pub sex: Sex,
    pub is_prop: bool,
    pub category: u32,
}

/// One importable asset unit
///
/// A drawable is owned by exactly one addon once committed. `number` is its
/// position among drawables sharing its slot inside that addon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub id: Uuid,
    /// Path of the base asset file
    pub file_path: PathBuf,
    pub category: u32,
    pub is_prop: bool,
    pub sex: Sex,
    pub number: u32,
    /// Derived display name, e.g. `jbib_003`
    pub name: String,
    pub group: Option<String>,
    pub audio: Option<String>,
    pub render_flag: Option<String>,
    pub flags: Vec<String>,
    /// High-heels adjustment, present when enabled
    pub high_heels: Option<f32>,
    /// Hair-scale adjustment, present when enabled
    pub hair_scale: Option<f32>,
    pub hides_hair: bool,
    pub first_person_path: Option<PathBuf>,
    pub physics_path: Option<PathBuf>,
    /// Marks drawables added during this session
    pub is_new: bool,
}

impl Drawable {
    /// Create a drawable for a classified base asset file
    pub fn new(file_path: impl Into<PathBuf>, sex: Sex, is_prop: bool, category: u32) -> Self {
        let mut drawable = Self {
            id: Uuid::new_v4(),
            file_path: file_path.into(),
            category,
            is_prop,
            sex,
            number: 0,
            name: String::new(),
            group: None,
            audio: None,
            render_flag: None,
            flags: Vec::new(),
            high_heels: None,
            hair_scale: None,
            hides_hair: false,
            first_person_path: None,
            physics_path: None,
            is_new: false,
        };
        drawable.set_name();
        drawable
    }

    pub fn slot(&self) -> DrawableSlot {
        DrawableSlot {
            sex: self.sex,
            is_prop: self.is_prop,
            category: self.category,
        }
    }

    /// Regenerate `name` from category and number
    pub fn set_name(&mut self) {
        self.name = match category::name(self.category, self.is_prop) {
            Some(slot_name) => format!("{}_{:03}", slot_name, self.number),
            None if self.is_prop => format!("p_{}_{:03}", self.category, self.number),
            None => format!("{}_{:03}", self.category, self.number),
        };
    }
}
