//! Ingestion pipeline services

pub mod addon_scanner;
pub mod alt_variation_resolver;
pub mod asset_store;
pub mod definition_loader;
pub mod duplicate_registry;
pub mod group_extractor;
pub mod metadata_enricher;
pub mod pattern_classifier;
pub mod type_resolver;
pub mod variant_linker;

pub use addon_scanner::{discover, AddonFiles, ScanError};
pub use asset_store::{AssetStore, StorageError};
pub use definition_loader::{DefinitionLoader, JsonDefinitionLoader};
pub use duplicate_registry::{DuplicateGroup, DuplicateRegistry, FingerprintRegistry};
pub use pattern_classifier::{FileRole, PatternClassifier};
pub use type_resolver::{FilenameTypeResolver, ResolvedType, TypeResolver};
