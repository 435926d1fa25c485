//! Loading character definition and alternate variation files

use crate::models::{PedAlternativeVariations, PedDefinition};
use addonkit_common::{Error, Result};
use std::path::Path;

/// Decodes a character definition resource
///
/// The `.ymt` binary format is decoded by an external parser; implementations
/// adapt that parser's output into a [`PedDefinition`].
pub trait DefinitionLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<PedDefinition>;
}

/// Reads a definition previously exported to JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDefinitionLoader;

impl DefinitionLoader for JsonDefinitionLoader {
    fn load(&self, path: &Path) -> Result<PedDefinition> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Definition(format!("Invalid definition {}: {}", path.display(), e))
        })
    }
}

/// Read and decode a `pedalternativevariations*.meta` file
pub fn load_alt_variations(path: &Path) -> Result<PedAlternativeVariations> {
    let content = std::fs::read_to_string(path)?;
    PedAlternativeVariations::from_xml(&content)
}
