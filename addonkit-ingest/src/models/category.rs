//! Drawable category numbering
//!
//! Components and props use separate numbering spaces, so a category number
//! is only meaningful together with the prop flag.

/// Component slot names indexed by category number
pub const COMPONENT_NAMES: [&str; 12] = [
    "head", "berd", "hair", "uppr", "lowr", "hand", "feet", "teef", "accs", "task", "decl", "jbib",
];

/// Prop anchor names indexed by category number
pub const PROP_NAMES: [&str; 13] = [
    "p_head", "p_eyes", "p_ears", "p_mouth", "p_lhand", "p_rhand", "p_lwrist", "p_rwrist",
    "p_lhip", "p_lfoot", "p_rfoot", "p_ph_lhand", "p_ph_rhand",
];

/// Slot name for a category, if it is a known one
pub fn name(category: u32, is_prop: bool) -> Option<&'static str> {
    let table: &[&str] = if is_prop { &PROP_NAMES } else { &COMPONENT_NAMES };
    table.get(category as usize).copied()
}

/// Category number for a slot name
pub fn from_name(name: &str, is_prop: bool) -> Option<u32> {
    let table: &[&str] = if is_prop { &PROP_NAMES } else { &COMPONENT_NAMES };
    table
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        assert_eq!(name(11, false), Some("jbib"));
        assert_eq!(name(0, true), Some("p_head"));
        assert_eq!(from_name("JBIB", false), Some(11));
        assert_eq!(from_name("p_lwrist", true), Some(6));
        assert_eq!(name(40, false), None);
    }
}
