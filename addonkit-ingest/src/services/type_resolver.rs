//! Drawable type resolution
//!
//! Decoding a drawable binary to find its slot is an external concern; the
//! pipeline only depends on the [`TypeResolver`] trait. [`FilenameTypeResolver`]
//! resolves from the game's file naming convention instead of file content.

use crate::models::category;
use std::path::Path;

/// Resolved slot of a drawable file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    pub is_prop: bool,
    pub category: u32,
}

/// Resolves a file to its drawable category
///
/// Returns `None` for unresolvable input; the pipeline skips such files.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, path: &Path) -> Option<ResolvedType>;
}

/// Resolves category from names like `jbib_000_u.ydd` or `p_head_002.ydd`
///
/// A `ped^` prefix is ignored. Physics files (`.yld`) resolve the same way as
/// the drawable they belong to.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameTypeResolver;

impl TypeResolver for FilenameTypeResolver {
    fn resolve(&self, path: &Path) -> Option<ResolvedType> {
        let file_name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        let local = file_name.rsplit('^').next().unwrap_or(&file_name);

        let extension = Path::new(local).extension()?.to_str()?;
        if extension != "ydd" && extension != "yld" {
            return None;
        }

        if local.starts_with("p_") {
            // Longest prop name first so `p_ph_lhand` wins over shorter prefixes
            let mut names: Vec<(usize, &str)> =
                category::PROP_NAMES.iter().copied().enumerate().collect();
            names.sort_by_key(|(_, n)| std::cmp::Reverse(n.len()));
            return names
                .into_iter()
                .find(|(_, n)| local.starts_with(&format!("{}_", n)))
                .map(|(i, _)| ResolvedType {
                    is_prop: true,
                    category: i as u32,
                });
        }

        let slot_name = local.split('_').next()?;
        category::from_name(slot_name, false).map(|category| ResolvedType {
            is_prop: false,
            category,
        })
    }
}
