//! Path filtering for archive records
//!
//! A `PathFilter` wraps a compiled regular expression. Matching is an
//! unanchored search, so `^a/` selects everything under `a/` while a bare
//! `snapshot` selects any path containing that text.

use crate::error::ConfigError;
use regex::Regex;

/// Pattern that selects every path
pub const DEFAULT_PATTERN: &str = ".*";

/// Decides which archive records are eligible for restore
#[derive(Debug, Clone)]
pub struct PathFilter {
    regex: Regex,
}

impl PathFilter {
    /// Compile a filter from a pattern string
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// Check whether a path should be restored
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_PATTERN).expect("default pattern is valid"),
        }
    }
}
