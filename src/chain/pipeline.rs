use std::path::Path;

use serde::Serialize;

use super::FilterChain;
use crate::document::XmlDocument;

/// Final decision for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Admission {
    /// Passed both phases; ready for mapping
    Admitted,
    /// Rejected before the file was read
    RejectedByPath,
    /// Parsed, then rejected by a content filter
    RejectedByContent,
    /// Could not be read or parsed
    ParseFailed { reason: String },
    /// A content query failed at runtime
    EvaluationFailed { reason: String },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    /// Why the candidate could not be decided; `None` for every decided outcome
    pub fn reason(&self) -> Option<&str> {
        match self {
            Admission::ParseFailed { reason } | Admission::EvaluationFailed { reason } => {
                Some(reason.as_str())
            }
            Admission::Admitted | Admission::RejectedByPath | Admission::RejectedByContent => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Admission::Admitted => "admitted",
            Admission::RejectedByPath => "rejected by path",
            Admission::RejectedByContent => "rejected by content",
            Admission::ParseFailed { .. } => "parse failed",
            Admission::EvaluationFailed { .. } => "evaluation failed",
        }
    }
}

/// Run one candidate through both phases
///
/// The file is only read and parsed when the path phase admits it and the
/// chain has at least one content filter.
pub fn evaluate_candidate(chain: &FilterChain, path: &Path) -> Admission {
    if !chain.admit_path(path) {
        tracing::debug!("Rejected by path: {}", path.display());
        return Admission::RejectedByPath;
    }

    if !chain.needs_document() {
        tracing::debug!("Admitted (path only): {}", path.display());
        return Admission::Admitted;
    }

    let document = match XmlDocument::from_path(path) {
        Ok(document) => document,
        Err(e) => {
            return Admission::ParseFailed {
                reason: e.to_string(),
            };
        }
    };

    match chain.admit_document(&document) {
        Ok(true) => {
            tracing::debug!("Admitted: {}", path.display());
            Admission::Admitted
        }
        Ok(false) => {
            tracing::debug!("Rejected by content: {}", path.display());
            Admission::RejectedByContent
        }
        Err(e) => Admission::EvaluationFailed {
            reason: e.to_string(),
        },
    }
}
