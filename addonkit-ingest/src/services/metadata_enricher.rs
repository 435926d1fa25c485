//! Metadata enrichment from a character definition
//!
//! Definition records are positional: the Nth drawable of a category (in
//! submission order) owns the Nth record of that category. Tables are built
//! once per submission and an [`OccurrenceCounter`] hands out the positions.

use crate::models::{ComponentInfo, Drawable, PedDefinition, PropMetadata};
use std::collections::HashMap;

/// Lookup tables built from one character definition
#[derive(Debug, Clone, Default)]
pub struct DefinitionTables {
    /// (component type, component index) → component record
    components: HashMap<(u32, u32), ComponentInfo>,
    /// (anchor id, prop id) → prop record
    props: HashMap<(u32, u32), PropMetadata>,
}

impl DefinitionTables {
    pub fn build(definition: &PedDefinition) -> Self {
        let components = definition
            .components
            .iter()
            .map(|c| ((c.component_type, c.component_index), c.clone()))
            .collect();

        let props = if definition.num_avail_props > 0 {
            definition
                .props
                .iter()
                .map(|p| ((p.anchor_id, p.prop_id), p.clone()))
                .collect()
        } else {
            HashMap::new()
        };

        Self { components, props }
    }

    pub fn component(&self, category: u32, occurrence: u32) -> Option<&ComponentInfo> {
        self.components.get(&(category, occurrence))
    }

    pub fn prop(&self, anchor: u32, occurrence: u32) -> Option<&PropMetadata> {
        self.props.get(&(anchor, occurrence))
    }
}

/// Running 0-based occurrence index per (category, prop flag)
#[derive(Debug, Default)]
pub struct OccurrenceCounter {
    counts: HashMap<(u32, bool), u32>,
}

impl OccurrenceCounter {
    /// Claim the next occurrence index for a category
    pub fn next(&mut self, category: u32, is_prop: bool) -> u32 {
        let count = self.counts.entry((category, is_prop)).or_insert(0);
        let index = *count;
        *count += 1;
        index
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Expand a flag bitfield into one label per set bit
///
/// Labels are the decimal bit values, lowest first: `0b101` → `["1", "4"]`.
pub fn expand_flags(bits: u32) -> Vec<String> {
    (0..32)
        .map(|shift| 1u32 << shift)
        .filter(|bit| bits & bit != 0)
        .map(|bit| bit.to_string())
        .collect()
}

/// Annotate a drawable with the definition record at `occurrence`
///
/// Returns whether any record was applied. Missing records leave the drawable
/// untouched.
pub fn enrich(drawable: &mut Drawable, tables: &DefinitionTables, occurrence: u32) -> bool {
    if drawable.is_prop {
        let Some(meta) = tables.prop(drawable.category, occurrence) else {
            return false;
        };
        drawable.audio = Some(meta.audio_id.clone());
        drawable.render_flag = Some(meta.render_flags.clone());
        drawable.flags = expand_flags(meta.prop_flags);
        if meta.hair_scale() != 0.0 {
            drawable.hair_scale = Some(meta.hair_scale().abs());
        }
        return true;
    }

    let Some(info) = tables.component(drawable.category, occurrence) else {
        return false;
    };
    drawable.audio = Some(info.audio_id.clone());
    drawable.flags = expand_flags(info.flags);
    if info.high_heels() != 0.0 {
        drawable.high_heels = Some(info.high_heels());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;

    fn definition() -> PedDefinition {
        PedDefinition {
            components: vec![
                ComponentInfo {
                    component_type: 6,
                    component_index: 0,
                    flags: 0,
                    audio_id: "none".into(),
                    expression_mods: [0.0; 5],
                },
                ComponentInfo {
                    component_type: 6,
                    component_index: 1,
                    flags: 0b101,
                    audio_id: "heels_audio".into(),
                    expression_mods: [0.0, 0.0, 0.0, 0.0, 0.3],
                },
            ],
            props: vec![PropMetadata {
                anchor_id: 0,
                prop_id: 0,
                audio_id: "hat_audio".into(),
                render_flags: "PRF_ALPHA".into(),
                prop_flags: 2,
                expression_mods: [-0.5, 0.0, 0.0, 0.0, 0.0],
            }],
            num_avail_props: 1,
        }
    }

    #[test]
    fn test_occurrence_counter_per_category_and_prop_flag() {
        let mut counter = OccurrenceCounter::default();
        assert_eq!(counter.next(6, false), 0);
        assert_eq!(counter.next(6, false), 1);
        assert_eq!(counter.next(6, true), 0);
        assert_eq!(counter.next(4, false), 0);
        counter.reset();
        assert_eq!(counter.next(6, false), 0);
    }

    #[test]
    fn test_component_enrichment_with_high_heels() {
        let tables = DefinitionTables::build(&definition());
        let mut feet = Drawable::new("feet_001_u.ydd", Sex::Female, false, 6);

        assert!(enrich(&mut feet, &tables, 1));
        assert_eq!(feet.audio.as_deref(), Some("heels_audio"));
        assert_eq!(feet.flags, vec!["1".to_string(), "4".to_string()]);
        assert_eq!(feet.high_heels, Some(0.3));
    }

    #[test]
    fn test_zero_expression_mod_leaves_adjustment_unset() {
        let tables = DefinitionTables::build(&definition());
        let mut feet = Drawable::new("feet_000_u.ydd", Sex::Female, false, 6);

        assert!(enrich(&mut feet, &tables, 0));
        assert_eq!(feet.high_heels, None);
        assert!(feet.flags.is_empty());
    }

    #[test]
    fn test_prop_enrichment_uses_absolute_hair_scale() {
        let tables = DefinitionTables::build(&definition());
        let mut hat = Drawable::new("p_head_000.ydd", Sex::Female, true, 0);

        assert!(enrich(&mut hat, &tables, 0));
        assert_eq!(hat.render_flag.as_deref(), Some("PRF_ALPHA"));
        assert_eq!(hat.flags, vec!["2".to_string()]);
        assert_eq!(hat.hair_scale, Some(0.5));
    }

    #[test]
    fn test_props_ignored_without_available_props() {
        let mut def = definition();
        def.num_avail_props = 0;
        let tables = DefinitionTables::build(&def);
        let mut hat = Drawable::new("p_head_000.ydd", Sex::Female, true, 0);

        assert!(!enrich(&mut hat, &tables, 0));
        assert_eq!(hat.audio, None);
    }

    #[test]
    fn test_missing_record_is_tolerated() {
        let tables = DefinitionTables::build(&definition());
        let mut jbib = Drawable::new("jbib_000_u.ydd", Sex::Female, false, 11);
        let before = jbib.clone();
        assert!(!enrich(&mut jbib, &tables, 0));
        assert_eq!(jbib, before);
    }
}
