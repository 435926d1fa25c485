//! # addonkit Common Library
//!
//! Shared code for the addonkit workspace:
//! - Error and result types
//! - TOML configuration loading and resolution
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
