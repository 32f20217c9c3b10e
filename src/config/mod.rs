//! Configuration management for xmlsift
//!
//! This module defines the typed configuration model (input discovery, run
//! policy and the filter tree) and turns filter entries into [`FilterNode`]s.
//! Loading and merging of configuration sources lives in [`loader`].

pub mod loader;
pub mod smart_load;

pub use smart_load::ConfigFormat;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::FilterChain;
use crate::filter::{FilterError, FilterNode, Namespaces, PathMatchMode};
use crate::parallel::ParallelConfig;

/// Main configuration structure for xmlsift
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct XmlsiftConfig {
    /// Input discovery settings
    #[serde(default)]
    pub input: InputConfig,

    /// Run policy and parallelism
    #[serde(default)]
    pub run: RunConfig,

    /// Top-level filters, applied in order
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

/// How directories given on the command line are expanded into candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Follow symbolic links while walking directories
    pub follow_symlinks: bool,

    /// Honour .gitignore / .ignore files while walking directories
    pub respect_ignore_files: bool,

    /// Include hidden files and directories
    pub include_hidden: bool,

    /// Maximum directory depth (0 = unlimited)
    pub max_depth: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            respect_ignore_files: true,
            include_hidden: false,
            max_depth: 0,
        }
    }
}

/// What a run does when a candidate cannot be parsed or evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Log a warning and continue with the next candidate
    #[default]
    Skip,
    /// Fail the run
    Abort,
}

/// Run policy and parallelism settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub on_error: OnError,

    /// Maximum worker threads (0 = derive from CPU count)
    pub max_threads: usize,

    /// Percentage of CPU cores to use when max_threads is 0
    pub thread_percentage: u8,

    /// Candidate count below which the run stays single-threaded
    pub parallel_threshold: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            on_error: OnError::Skip,
            max_threads: 0,
            thread_percentage: 75,
            parallel_threshold: 32,
        }
    }
}

impl From<&RunConfig> for ParallelConfig {
    fn from(run: &RunConfig) -> Self {
        Self {
            max_threads: run.max_threads,
            thread_percentage: run.thread_percentage,
            parallel_threshold: run.parallel_threshold,
            ..ParallelConfig::default()
        }
    }
}

/// Kind of a configured filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Pass-through container for nested filters
    Group,
    /// Regex over the candidate path
    Path,
    /// XPath over the parsed document
    Content,
}

/// One filter entry, possibly with nested filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(rename = "type")]
    pub kind: FilterType,

    /// Regex for `path` filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Match the full path or only the file name (`path` filters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_on: Option<PathMatchMode>,

    /// XPath for `content` filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Prefix to namespace URI bindings for `content` filters
    #[serde(default, skip_serializing_if = "Namespaces::is_empty")]
    pub namespaces: Namespaces,

    /// Run even after an earlier top-level filter rejected the candidate
    #[serde(default)]
    pub always_execute: bool,

    /// Nested filters that must all agree
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterConfig>,
}

/// Errors turning configuration into a filter tree
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{location}: {kind} filter requires `{field}`")]
    MissingField {
        location: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("{location}: `{field}` is not valid on a {kind} filter")]
    UnexpectedField {
        location: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("{location}: {source}")]
    Filter {
        location: String,
        #[source]
        source: FilterError,
    },
}

impl FilterType {
    fn name(self) -> &'static str {
        match self {
            FilterType::Group => "group",
            FilterType::Path => "path",
            FilterType::Content => "content",
        }
    }
}

impl FilterConfig {
    /// Build this entry and its nested entries into a filter node
    pub fn build(&self) -> Result<FilterNode, ConfigError> {
        self.build_at("filter")
    }

    fn build_at(&self, location: &str) -> Result<FilterNode, ConfigError> {
        self.check_fields(location)?;

        let filter_error = |source: FilterError| ConfigError::Filter {
            location: location.to_string(),
            source,
        };

        let mut node = match self.kind {
            FilterType::Group => FilterNode::pass_through(),
            FilterType::Path => {
                let pattern = self.required(location, self.pattern.as_deref(), "pattern")?;
                FilterNode::path_name(pattern, self.match_on.unwrap_or_default()).map_err(filter_error)?
            }
            FilterType::Content => {
                let query = self.required(location, self.query.as_deref(), "query")?;
                FilterNode::content_query(&self.namespaces, query).map_err(filter_error)?
            }
        };

        node.set_always_execute(self.always_execute);

        for (index, child) in self.filters.iter().enumerate() {
            node.add_nested_filter(child.build_at(&format!("{location}.filters[{index}]"))?);
        }

        Ok(node)
    }

    fn required<'a>(
        &self,
        location: &str,
        value: Option<&'a str>,
        field: &'static str,
    ) -> Result<&'a str, ConfigError> {
        value.ok_or_else(|| ConfigError::MissingField {
            location: location.to_string(),
            kind: self.kind.name(),
            field,
        })
    }

    /// Reject fields that belong to another filter type
    fn check_fields(&self, location: &str) -> Result<(), ConfigError> {
        let stray = match self.kind {
            FilterType::Group => [
                ("pattern", self.pattern.is_some()),
                ("match_on", self.match_on.is_some()),
                ("query", self.query.is_some()),
                ("namespaces", !self.namespaces.is_empty()),
            ]
            .into_iter()
            .find(|(_, present)| *present),
            FilterType::Path => [
                ("query", self.query.is_some()),
                ("namespaces", !self.namespaces.is_empty()),
            ]
            .into_iter()
            .find(|(_, present)| *present),
            FilterType::Content => [
                ("pattern", self.pattern.is_some()),
                ("match_on", self.match_on.is_some()),
            ]
            .into_iter()
            .find(|(_, present)| *present),
        };

        match stray {
            Some((field, _)) => Err(ConfigError::UnexpectedField {
                location: location.to_string(),
                kind: self.kind.name(),
                field,
            }),
            None => Ok(()),
        }
    }
}

impl XmlsiftConfig {
    /// Build the top-level filter list into a chain
    pub fn build_chain(&self) -> Result<FilterChain, ConfigError> {
        let filters = self
            .filters
            .iter()
            .enumerate()
            .map(|(index, filter)| filter.build_at(&format!("filters[{index}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterChain::new(filters))
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=100).contains(&self.run.thread_percentage) {
            anyhow::bail!(
                "run.thread_percentage must be between 1 and 100, got {}",
                self.run.thread_percentage
            );
        }

        self.build_chain()?;
        Ok(())
    }
}
