use std::path::Path;

use super::content::{ContentQuery, Namespaces};
use super::error::FilterError;
use super::path::{PathMatchMode, PathNameMatcher};
use crate::document::XmlDocument;

/// Intrinsic test carried by a filter node
#[derive(Debug)]
pub enum Predicate {
    /// No test of its own; hosts nested filters
    PassThrough,
    /// Regex over the candidate path (pre-parse phase)
    PathName(PathNameMatcher),
    /// XPath over the parsed document (post-parse phase)
    ContentQuery(ContentQuery),
    /// Fixed answer that counts how often it is asked
    #[cfg(test)]
    Counting(counting::Counting),
}

impl Predicate {
    /// Intrinsic test for the path phase. Content queries do not look at paths.
    fn accepts_path(&self, path: &Path) -> bool {
        match self {
            Predicate::PassThrough | Predicate::ContentQuery(_) => true,
            Predicate::PathName(matcher) => matcher.matches(path),
            #[cfg(test)]
            Predicate::Counting(counter) => counter.ask(),
        }
    }

    /// Intrinsic test for the document phase. Path filters do not look at documents.
    fn accepts_document(&self, document: &XmlDocument) -> Result<bool, FilterError> {
        match self {
            Predicate::PassThrough | Predicate::PathName(_) => Ok(true),
            Predicate::ContentQuery(query) => query.matches(document),
            #[cfg(test)]
            Predicate::Counting(counter) => Ok(counter.ask()),
        }
    }

    /// Short label for logs and the `config validate` tree
    pub fn describe(&self) -> String {
        match self {
            Predicate::PassThrough => "group".to_string(),
            Predicate::PathName(matcher) => match matcher.mode() {
                PathMatchMode::FullPath => format!("path /{}/", matcher.pattern()),
                PathMatchMode::LocalName => format!("name /{}/", matcher.pattern()),
            },
            Predicate::ContentQuery(query) => format!("content {}", query.query()),
            #[cfg(test)]
            Predicate::Counting(counter) => format!("counting {}", counter.answer()),
        }
    }
}

/// A node in the filter tree
///
/// A node admits a candidate when its own predicate passes and every nested
/// filter, evaluated in insertion order, admits it too. Evaluation stops at
/// the first rejection.
#[derive(Debug)]
pub struct FilterNode {
    predicate: Predicate,
    children: Vec<FilterNode>,
    always_execute: bool,
}

impl FilterNode {
    fn with_predicate(predicate: Predicate) -> Self {
        Self {
            predicate,
            children: Vec::new(),
            always_execute: false,
        }
    }

    /// Container whose only job is to group nested filters
    pub fn pass_through() -> Self {
        Self::with_predicate(Predicate::PassThrough)
    }

    /// Filter on a regex searched for in the candidate path
    pub fn path_name(pattern: &str, mode: PathMatchMode) -> Result<Self, FilterError> {
        Ok(Self::with_predicate(Predicate::PathName(PathNameMatcher::new(
            pattern, mode,
        )?)))
    }

    /// Filter on an XPath evaluated against the parsed document
    pub fn content_query(namespaces: &Namespaces, query: &str) -> Result<Self, FilterError> {
        Ok(Self::with_predicate(Predicate::ContentQuery(ContentQuery::new(
            namespaces, query,
        )?)))
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn add_nested_filter(&mut self, child: FilterNode) {
        self.children.push(child);
    }

    pub fn with_nested_filter(mut self, child: FilterNode) -> Self {
        self.add_nested_filter(child);
        self
    }

    pub fn nested_filters(&self) -> &[FilterNode] {
        &self.children
    }

    pub fn always_execute(&self) -> bool {
        self.always_execute
    }

    pub fn set_always_execute(&mut self, always_execute: bool) {
        self.always_execute = always_execute;
    }

    /// True when this node or any descendant inspects document content
    pub fn needs_document(&self) -> bool {
        matches!(self.predicate, Predicate::ContentQuery(_))
            || self.children.iter().any(FilterNode::needs_document)
    }

    /// Pre-parse admission check
    pub fn include_by_path(&self, path: &Path) -> bool {
        if !self.predicate.accepts_path(path) {
            tracing::trace!("{} rejected {}", self.predicate.describe(), path.display());
            return false;
        }

        self.include_nested_by_path(path)
    }

    /// Post-parse admission check
    pub fn include_by_document(&self, document: &XmlDocument) -> Result<bool, FilterError> {
        if !self.predicate.accepts_document(document)? {
            tracing::trace!("{} rejected document", self.predicate.describe());
            return Ok(false);
        }

        self.include_nested_by_document(document)
    }

    fn include_nested_by_path(&self, path: &Path) -> bool {
        self.children.iter().all(|child| child.include_by_path(path))
    }

    fn include_nested_by_document(&self, document: &XmlDocument) -> Result<bool, FilterError> {
        for child in &self.children {
            if !child.include_by_document(document)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
