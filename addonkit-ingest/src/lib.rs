//! addonkit-ingest library
//!
//! Organizes drawable asset files into capacity-bounded addons.
//!
//! **Pipeline:**
//! 1. [`queue::IngestQueue`] accepts file lists and drains them on one worker
//! 2. The worker resolves each file's slot and classifies it by file name
//! 3. Base files become drawables, enriched from the character definition
//! 4. First-person and physics companions are linked to their base drawable
//! 5. Drawables are committed through [`addon_manager::AddonManager`]
//!
//! Mutations of the shared addon collection run on a [`executor::UiExecutor`].

pub mod addon_manager;
pub mod executor;
pub mod models;
pub mod queue;
pub mod services;

pub use addon_manager::{AddonManager, Placement, SharedAddonManager};
pub use executor::{ChannelExecutor, InlineExecutor, UiExecutor};
pub use queue::{CompletionSignal, ImportContext, IngestQueue, IngestSummary};
