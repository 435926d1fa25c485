//! Group labels derived from import folder structure
//!
//! ```text
//! <root>/pack/[female]/tops/summer/jbib/jbib_000_u.ydd  →  "tops/summer"
//! ```

use crate::models::Sex;
use std::path::{Component, Path};

/// Group label for a file imported from under `base_path`
///
/// The file's folder (relative to `base_path`) must be more than three levels
/// deep and contain the sex marker folder followed by at least two more
/// segments; the group is the segments between the marker and the final
/// folder.
pub fn extract_group(file_path: &Path, base_path: &Path, sex: Sex) -> Option<String> {
    let dir = file_path.parent()?;
    let relative = dir.strip_prefix(base_path).ok()?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.len() <= 3 {
        return None;
    }

    let marker = sex.marker_folder();
    let marker_index = parts.iter().position(|p| p.eq_ignore_ascii_case(marker))?;
    if marker_index + 2 >= parts.len() {
        return None;
    }

    Some(parts[marker_index + 1..parts.len() - 1].join("/"))
}
