//! Test Helper Utilities
//!
//! Shared utilities for testing addonkit-ingest

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;

// Re-export commonly used items
pub use fixtures::{FixedResolver, Harness, RecordingRegistry};
pub use log_capture::{init_test_logging, LogCapture};
