//! Decoded character definition (`.ymt`) data
//!
//! The binary resource is decoded by an external parser; this module only
//! holds the component and prop metadata the enricher reads.

use serde::{Deserialize, Serialize};

/// Per-component metadata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub component_type: u32,
    pub component_index: u32,
    pub flags: u32,
    pub audio_id: String,
    /// Expression modifiers; index 4 carries the high-heels amount
    #[serde(default)]
    pub expression_mods: [f32; 5],
}

/// Per-prop metadata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropMetadata {
    pub anchor_id: u32,
    pub prop_id: u32,
    pub audio_id: String,
    pub render_flags: String,
    pub prop_flags: u32,
    /// Expression modifiers; index 0 carries the hair-scale amount
    #[serde(default)]
    pub expression_mods: [f32; 5],
}

/// Component and prop metadata arrays of one character definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PedDefinition {
    #[serde(default)]
    pub components: Vec<ComponentInfo>,
    #[serde(default)]
    pub props: Vec<PropMetadata>,
    /// Prop metadata is ignored unless the definition declares available props
    #[serde(default)]
    pub num_avail_props: u32,
}

impl ComponentInfo {
    pub fn high_heels(&self) -> f32 {
        self.expression_mods[4]
    }
}

impl PropMetadata {
    pub fn hair_scale(&self) -> f32 {
        self.expression_mods[0]
    }
}
