//! # xmlsift
//!
//! Decides which XML documents enter an XML-to-CSV conversion run.
//!
//! A run applies a tree of filters to every candidate in two phases:
//!
//! - **Path phase**: regular expressions over the candidate path, evaluated
//!   before the file is read. A rejection here means the file is never parsed.
//! - **Document phase**: XPath 1.0 queries over the parsed document, with
//!   configurable namespace prefixes.
//!
//! Filters nest: a node admits a candidate only if its own predicate and every
//! nested filter admit it, evaluated in order with short-circuiting.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the effective configuration
//! xmlsift config show
//!
//! # List the documents that pass the configured filters
//! xmlsift filter data/ --format files
//! ```

pub mod chain;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod document;
pub mod filter;
pub mod parallel;
pub mod report;

pub use chain::{Admission, FilterChain};
pub use cli::{Cli, Output};
pub use config::XmlsiftConfig;
pub use filter::{FilterError, FilterNode};

/// Result type alias for xmlsift operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
