//! Character sex and its naming conventions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Freemode character a drawable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Ped model name used in file names and definition files
    pub fn ped_name(self) -> &'static str {
        match self {
            Sex::Male => "mp_m_freemode_01",
            Sex::Female => "mp_f_freemode_01",
        }
    }

    /// Folder name marking the start of a sex-specific subtree
    pub fn marker_folder(self) -> &'static str {
        match self {
            Sex::Male => "[male]",
            Sex::Female => "[female]",
        }
    }

    /// Infer sex from an addon file name (male iff it names the male ped)
    pub fn from_addon_name(name: &str) -> Self {
        if name.contains(Sex::Male.ped_name()) {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}' (expected male or female)", other)),
        }
    }
}
