//! Data models for drawable ingestion

pub mod addon;
pub mod alt_variations;
pub mod category;
pub mod definition;
pub mod drawable;
pub mod sex;

pub use addon::Addon;
pub use alt_variations::{AlternateSwitch, PedAlternativeVariations, PedVariation, SourceAsset};
pub use definition::{ComponentInfo, PedDefinition, PropMetadata};
pub use drawable::{Drawable, DrawableSlot};
pub use sex::Sex;
