//! Duplicate drawable detection
//!
//! Accepted drawables register a content fingerprint; drawables sharing a
//! fingerprint form a duplicate group the user reviews later. Registration
//! never rejects a drawable. Groups are keyed by fingerprint so a reviewed
//! group can be ignored by key.

use crate::models::Drawable;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

/// Drawables sharing one content fingerprint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DuplicateGroup {
    pub fingerprint: String,
    pub drawables: Vec<Uuid>,
}

/// Registry of accepted drawables keyed by content fingerprint
pub trait DuplicateRegistry: Send + Sync {
    fn register(&self, drawable: &Drawable);
    fn unregister(&self, drawable: &Drawable);

    /// Groups with two or more members
    fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        Vec::new()
    }
}

#[derive(Default)]
struct RegistryState {
    by_fingerprint: HashMap<String, Vec<Uuid>>,
    by_drawable: HashMap<Uuid, String>,
}

/// SHA-256 content fingerprint registry
#[derive(Default)]
pub struct FingerprintRegistry {
    state: Mutex<RegistryState>,
}

impl FingerprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-256 of a file, read in 1MB chunks
    pub fn fingerprint(path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 1024 * 1024];

        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl DuplicateRegistry for FingerprintRegistry {
    fn register(&self, drawable: &Drawable) {
        let fingerprint = match Self::fingerprint(&drawable.file_path) {
            Ok(fp) => fp,
            Err(e) => {
                tracing::warn!(
                    path = %drawable.file_path.display(),
                    error = %e,
                    "Could not fingerprint drawable, duplicate detection skipped"
                );
                return;
            }
        };

        let Ok(mut state) = self.state.lock() else {
            tracing::error!("Duplicate registry lock poisoned");
            return;
        };

        let members = state.by_fingerprint.entry(fingerprint.clone()).or_default();
        if !members.contains(&drawable.id) {
            members.push(drawable.id);
        }
        if members.len() > 1 {
            tracing::info!(
                drawable = %drawable.name,
                matches = members.len() - 1,
                "Duplicate drawable detected"
            );
        }
        state.by_drawable.insert(drawable.id, fingerprint);
    }

    fn unregister(&self, drawable: &Drawable) {
        let Ok(mut state) = self.state.lock() else {
            tracing::error!("Duplicate registry lock poisoned");
            return;
        };

        let Some(fingerprint) = state.by_drawable.remove(&drawable.id) else {
            return;
        };
        if let Some(members) = state.by_fingerprint.get_mut(&fingerprint) {
            members.retain(|id| *id != drawable.id);
            if members.is_empty() {
                state.by_fingerprint.remove(&fingerprint);
            }
        }
    }

    fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        let Ok(state) = self.state.lock() else {
            tracing::error!("Duplicate registry lock poisoned");
            return Vec::new();
        };
        let mut groups: Vec<DuplicateGroup> = state
            .by_fingerprint
            .iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(fingerprint, members)| DuplicateGroup {
                fingerprint: fingerprint.clone(),
                drawables: members.clone(),
            })
            .collect();
        groups.sort();
        groups
    }
}
