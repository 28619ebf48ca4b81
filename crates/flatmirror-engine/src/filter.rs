//! Allow/deny filtering of remote entry names.

use regex::Regex;

use crate::config::ConfigError;

/// Pattern filter over listing entry names.
///
/// Exclude prunes matching entries (directories and files) during traversal;
/// IncludeOnly restricts which files are downloaded and never prunes
/// directories, so the walk can still reach matching files deeper down.
#[derive(Debug, Clone, Default)]
pub enum NameFilter {
    #[default]
    None,
    Exclude(Regex),
    IncludeOnly(Regex),
}

impl NameFilter {
    /// Build a filter from the two mutually exclusive pattern options.
    pub fn from_patterns(
        exclude: Option<&str>,
        include: Option<&str>,
    ) -> Result<Self, ConfigError> {
        match (exclude, include) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingFilters),
            (Some(pattern), None) => Ok(Self::Exclude(Regex::new(pattern)?)),
            (None, Some(pattern)) => Ok(Self::IncludeOnly(Regex::new(pattern)?)),
            (None, None) => Ok(Self::None),
        }
    }

    /// Whether a listing entry is pruned outright.
    pub fn excludes(&self, name: &str) -> bool {
        matches!(self, Self::Exclude(re) if re.is_match(name))
    }

    /// The include-only pattern applied to file names at download time.
    pub fn include_pattern(&self) -> Option<&Regex> {
        match self {
            Self::IncludeOnly(re) => Some(re),
            _ => None,
        }
    }
}
