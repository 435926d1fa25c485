//! Addon folder discovery
//!
//! Locates the files belonging to an exported addon given its `.meta` file:
//! drawables, cloth physics, the character definition and an optional
//! alternate variations file.

use super::pattern_classifier::PatternClassifier;
use crate::models::Sex;
use regex::RegexBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Addon discovery errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Meta path has no usable file name or parent folder
    #[error("Invalid addon meta path: {0}")]
    InvalidMetaPath(PathBuf),

    /// No `.ydd` files belong to the addon
    #[error("No .ydd files found for selected .meta file ({0})")]
    NoDrawables(String),

    /// No `.ymt` file belongs to the addon
    #[error("No .ymt file found for selected .meta file ({0})")]
    NoDefinition(String),
}

impl From<ScanError> for addonkit_common::Error {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidMetaPath(_) => addonkit_common::Error::InvalidInput(err.to_string()),
            ScanError::NoDrawables(_) | ScanError::NoDefinition(_) => {
                addonkit_common::Error::NotFound(err.to_string())
            }
        }
    }
}

/// Files making up one addon
#[derive(Debug, Clone)]
pub struct AddonFiles {
    pub sex: Sex,
    /// Meta file stem, e.g. `mp_f_freemode_01_mypack`
    pub addon_name: String,
    /// Addon name without the ped part, e.g. `mypack`
    pub project_name: String,
    /// Folder the meta file lives in
    pub base_path: PathBuf,
    /// `.ydd` files ordered by drawable number, then name
    pub drawables: Vec<PathBuf>,
    /// `.yld` files ordered the same way
    pub physics: Vec<PathBuf>,
    pub definition: PathBuf,
    pub alt_variations: Option<PathBuf>,
}

impl AddonFiles {
    /// Drawables followed by physics files, the order they are submitted in
    pub fn submission_order(&self) -> Vec<PathBuf> {
        self.drawables.iter().chain(self.physics.iter()).cloned().collect()
    }
}

/// Discover the files of the addon described by `meta_path`
pub fn discover(meta_path: &Path) -> Result<AddonFiles, ScanError> {
    let invalid = || ScanError::InvalidMetaPath(meta_path.to_path_buf());
    let base_path = meta_path.parent().ok_or_else(invalid)?.to_path_buf();
    let addon_name = meta_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?
        .to_string();
    let meta_file_name = meta_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sex = Sex::from_addon_name(&addon_name);
    let ped = sex.ped_name();
    let project_name = addon_name.replace(ped, "").trim_start_matches('_').to_string();

    let member_pattern = RegexBuilder::new(&format!(
        r"^{}(_p)?.*?{}\^",
        regex::escape(ped),
        regex::escape(&project_name)
    ))
    .case_insensitive(true)
    .build()
    .map_err(|_| invalid())?;

    let mut all_files = Vec::new();
    for entry in WalkDir::new(&base_path).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => all_files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!("Error accessing entry: {}", e),
        }
    }
    all_files.sort();

    let has_extension = |path: &Path, ext: &str| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    };
    let file_name = |path: &Path| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let classifier = PatternClassifier::new();
    let ordered_members = |ext: &str| {
        let mut files: Vec<PathBuf> = all_files
            .iter()
            .filter(|f| has_extension(f.as_path(), ext))
            .filter(|f| member_pattern.is_match(&file_name(f.as_path())))
            .cloned()
            .collect();
        files.sort_by(|a, b| {
            let number = |p: &Path| classifier.drawable_number(p).unwrap_or(u32::MAX);
            number(a.as_path())
                .cmp(&number(b.as_path()))
                .then_with(|| file_name(a.as_path()).cmp(&file_name(b.as_path())))
        });
        files
    };

    let drawables = ordered_members("ydd");
    if drawables.is_empty() {
        return Err(ScanError::NoDrawables(meta_file_name));
    }
    let physics = ordered_members("yld");

    let definition = all_files
        .iter()
        .filter(|f| has_extension(f.as_path(), "ymt"))
        .find(|f| f.to_string_lossy().contains(&addon_name))
        .cloned()
        .ok_or(ScanError::NoDefinition(meta_file_name))?;

    let alt_variations = all_files
        .iter()
        .filter(|f| has_extension(f.as_path(), "meta"))
        .filter(|f| file_name(f.as_path()).starts_with("pedalternativevariations"))
        .find(|f| f.to_string_lossy().contains(&project_name))
        .cloned();

    tracing::info!(
        addon = %addon_name,
        drawables = drawables.len(),
        physics = physics.len(),
        has_alt_variations = alt_variations.is_some(),
        "Discovered addon files"
    );

    Ok(AddonFiles {
        sex,
        addon_name,
        project_name,
        base_path,
        drawables,
        physics,
        definition,
        alt_variations,
    })
}
