//! Parsed XML documents
//!
//! Wraps an `sxd-document` package so the filter engine can borrow a read-only
//! DOM for the content phase without caring how the bytes were parsed.
//! Files are decoded from their byte-order mark or declared encoding, and a
//! document type declaration is resolved before the text reaches the parser.

pub mod doctype;
pub mod encoding;

use std::fmt;
use std::path::{Path, PathBuf};

use sxd_document::{Package, dom, parser};
use thiserror::Error;

/// Errors raised while turning a candidate into a parsed document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid {encoding}", path.display())]
    Decode { path: PathBuf, encoding: &'static str },

    #[error("malformed XML in {origin}: {reason}")]
    Parse { origin: String, reason: String },
}

/// A parsed, queryable XML document
pub struct XmlDocument {
    package: Package,
    source: Option<PathBuf>,
}

impl XmlDocument {
    /// Parse an in-memory XML string
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let package = parse_package(xml, "<memory>")?;
        Ok(Self {
            package,
            source: None,
        })
    }

    /// Read and parse the file at `path`
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let content = encoding::decode(&bytes).map_err(|charset| DocumentError::Decode {
            path: path.to_path_buf(),
            encoding: charset.name(),
        })?;

        let package = parse_package(&content, &path.display().to_string())?;
        tracing::trace!("Parsed {} ({} bytes)", path.display(), bytes.len());

        Ok(Self {
            package,
            source: Some(path.to_path_buf()),
        })
    }

    /// Borrow the DOM for querying
    pub fn dom(&self) -> dom::Document<'_> {
        self.package.as_document()
    }

    /// File the document was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn parse_package(xml: &str, origin: &str) -> Result<Package, DocumentError> {
    let parse_error = |reason: String| DocumentError::Parse {
        origin: origin.to_string(),
        reason,
    };

    // The parser rejects a leading byte-order mark
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let xml = doctype::resolve(xml).map_err(parse_error)?;

    parser::parse(&xml).map_err(|e| parse_error(format!("{e:?}")))
}
