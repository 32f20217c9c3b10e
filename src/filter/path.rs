use std::borrow::Cow;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Which part of a candidate path the pattern is tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMatchMode {
    /// The whole path as given to the orchestrator
    #[default]
    FullPath,
    /// Only the final path component
    LocalName,
}

/// Path Filter - regex test applied before a candidate is read or parsed
///
/// The pattern is searched for anywhere in the selected string; anchor it
/// with `^`/`$` to require a prefix or suffix.
#[derive(Debug, Clone)]
pub struct PathNameMatcher {
    regex: Regex,
    mode: PathMatchMode,
}

impl PathNameMatcher {
    pub fn new(pattern: &str, mode: PathMatchMode) -> Result<Self, FilterError> {
        let regex = Regex::new(pattern).map_err(|source| FilterError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self { regex, mode })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn mode(&self) -> PathMatchMode {
        self.mode
    }

    /// Intrinsic test for the pre-parse phase
    pub fn matches(&self, path: &Path) -> bool {
        let Some(subject) = self.subject(path) else {
            tracing::warn!(
                "Path filter '{}' cannot take the local name of {}; treating as no match",
                self.pattern(),
                path.display()
            );
            return false;
        };

        self.regex.is_match(&subject)
    }

    fn subject<'a>(&self, path: &'a Path) -> Option<Cow<'a, str>> {
        match self.mode {
            PathMatchMode::FullPath => Some(path.to_string_lossy()),
            PathMatchMode::LocalName => path.file_name().map(|name| name.to_string_lossy()),
        }
    }
}
