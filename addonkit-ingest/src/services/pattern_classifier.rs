//! Filename pattern classification
//!
//! Decides from a file name alone whether a file is a base drawable, a
//! first-person variant, or a cloth physics companion. The binary type
//! resolver is not involved, so the table can be tested without asset files.

use regex::{Regex, RegexBuilder};
use std::path::Path;

/// Role a file plays in an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Regular drawable that becomes an item
    Base,
    /// First-person variant of a base drawable (`..._x_1.ydd`)
    FirstPerson,
    /// Cloth physics companion (`.yld`)
    Physics,
    /// Alternate-suffixed drawable that is not a first-person variant; ignored
    Alternate,
}

struct PatternRule {
    pattern: Regex,
    /// When set, a match is only accepted if this also matches
    refine: Option<(Regex, FileRole)>,
    role: FileRole,
}

/// Data-driven filename classifier
///
/// Rules are tried in order; the first match wins. A file matching no rule is
/// a [`FileRole::Base`] candidate.
pub struct PatternClassifier {
    rules: Vec<PatternRule>,
    number_pattern: Regex,
}

impl PatternClassifier {
    pub fn new() -> Self {
        // Patterns are literals known to compile
        let rules = vec![
            PatternRule {
                pattern: compile(r"_\w_\d+\.ydd$"),
                refine: Some((compile(r"_1\.ydd$"), FileRole::FirstPerson)),
                role: FileRole::Alternate,
            },
            PatternRule {
                pattern: compile(r"\.yld$"),
                refine: None,
                role: FileRole::Physics,
            },
        ];

        Self {
            rules,
            number_pattern: compile(r"_(\d+)(?:_|$)"),
        }
    }

    /// Classify a file by its name
    pub fn classify(&self, path: &Path) -> FileRole {
        let name = path.to_string_lossy();
        for rule in &self.rules {
            if !rule.pattern.is_match(&name) {
                continue;
            }
            return match &rule.refine {
                Some((refine, role)) if refine.is_match(&name) => *role,
                _ => rule.role,
            };
        }
        FileRole::Base
    }

    /// Drawable number embedded in a file name
    ///
    /// Only the part after the last `^` is considered; the number is the first
    /// `_`-delimited all-digit segment of the stem, e.g. `jbib_003_u.ydd` → 3,
    /// `mp_f_freemode_01^p_head_002.ydd` → 2.
    pub fn drawable_number(&self, path: &Path) -> Option<u32> {
        let file_name = path.file_name()?.to_string_lossy();
        let local = file_name.rsplit('^').next().unwrap_or(&file_name);
        let stem = match local.rfind('.') {
            Some(dot) => &local[..dot],
            None => local,
        };

        self.number_pattern
            .captures(stem)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("invalid built-in pattern {}: {}", pattern, e))
}
