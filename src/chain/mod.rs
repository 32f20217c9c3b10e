//! Top-level filter list applied to every candidate
//!
//! The chain walks its filters in configuration order. Once a filter rejects
//! a candidate the remaining filters are skipped, except those flagged
//! `always_execute`: they still run (for their side effects, such as logging
//! or validation) but can never turn the rejection back into an admission.
//!
//! The override only exists between top-level filters. Inside a filter the
//! nested children keep their plain short-circuit AND.

pub mod pipeline;
pub mod runner;

use std::convert::Infallible;
use std::path::Path;

use crate::document::XmlDocument;
use crate::filter::{FilterError, FilterNode};

pub use pipeline::{Admission, evaluate_candidate};
pub use runner::run;

/// Ordered list of top-level filters, frozen once built
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<FilterNode>,
    needs_document: bool,
}

impl FilterChain {
    pub fn new(filters: Vec<FilterNode>) -> Self {
        let needs_document = filters.iter().any(FilterNode::needs_document);
        Self {
            filters,
            needs_document,
        }
    }

    pub fn filters(&self) -> &[FilterNode] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether any filter inspects document content, i.e. whether admitted
    /// candidates have to be parsed at all
    pub fn needs_document(&self) -> bool {
        self.needs_document
    }

    /// Pre-parse decision for a candidate path
    pub fn admit_path(&self, path: &Path) -> bool {
        let outcome = self.apply("path", |filter| {
            Ok::<_, Infallible>(filter.include_by_path(path))
        });

        match outcome {
            Ok(admitted) => admitted,
            Err(never) => match never {},
        }
    }

    /// Post-parse decision for a candidate document
    pub fn admit_document(&self, document: &XmlDocument) -> Result<bool, FilterError> {
        self.apply("document", |filter| filter.include_by_document(document))
    }

    fn apply<E>(
        &self,
        phase: &str,
        mut include: impl FnMut(&FilterNode) -> Result<bool, E>,
    ) -> Result<bool, E> {
        let mut admitted = true;

        for (index, filter) in self.filters.iter().enumerate() {
            if admitted {
                if !include(filter)? {
                    tracing::debug!(
                        "{} phase: filter #{} ({}) rejected candidate",
                        phase,
                        index,
                        filter.predicate().describe()
                    );
                    admitted = false;
                }
            } else if filter.always_execute() {
                let included = include(filter)?;
                tracing::debug!(
                    "{} phase: always-execute filter #{} ({}) ran after rejection, result {} ignored",
                    phase,
                    index,
                    filter.predicate().describe(),
                    included
                );
            }
        }

        Ok(admitted)
    }

    /// Indented one-line-per-node rendering of the chain
    pub fn describe_tree(&self) -> Vec<String> {
        fn walk(node: &FilterNode, depth: usize, lines: &mut Vec<String>) {
            let marker = if node.always_execute() { " [always]" } else { "" };
            lines.push(format!("{}{}{}", "  ".repeat(depth), node.predicate().describe(), marker));
            for child in node.nested_filters() {
                walk(child, depth + 1, lines);
            }
        }

        let mut lines = Vec::new();
        for filter in &self.filters {
            walk(filter, 0, &mut lines);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::node::counting::{calls, counting_node};
    use crate::filter::{Namespaces, PathMatchMode};

    fn always(mut node: FilterNode) -> FilterNode {
        node.set_always_execute(true);
        node
    }

    #[test]
    fn test_empty_chain_admits_everything() {
        let chain = FilterChain::default();
        assert!(chain.is_empty());
        assert!(chain.admit_path(Path::new("anything")));
        assert!(chain.admit_document(&XmlDocument::parse("<x/>").unwrap()).unwrap());
        assert!(!chain.needs_document());
    }

    #[test]
    fn test_rejection_skips_later_filters() {
        let (first, first_calls) = counting_node(false);
        let (second, second_calls) = counting_node(true);
        let chain = FilterChain::new(vec![first, second]);

        assert!(!chain.admit_path(Path::new("a.xml")));
        assert_eq!(calls(&first_calls), 1);
        assert_eq!(calls(&second_calls), 0);
    }

    #[test]
    fn test_always_execute_runs_after_rejection_without_reversing_it() {
        let (first, first_calls) = counting_node(false);
        let (skipped, skipped_calls) = counting_node(true);
        let (forced, forced_calls) = counting_node(true);
        let chain = FilterChain::new(vec![first, skipped, always(forced)]);

        assert!(!chain.admit_path(Path::new("a.xml")));
        assert_eq!(calls(&first_calls), 1);
        assert_eq!(calls(&skipped_calls), 0);
        assert_eq!(calls(&forced_calls), 1);

        let doc = XmlDocument::parse("<x/>").unwrap();
        assert!(!chain.admit_document(&doc).unwrap());
        assert_eq!(calls(&forced_calls), 2);
    }

    #[test]
    fn test_always_execute_cannot_override_nested_rejection() {
        let (nested, nested_calls) = counting_node(true);
        let parent = FilterNode::path_name(r"\.xml$", PathMatchMode::FullPath)
            .unwrap()
            .with_nested_filter(always(nested));
        let chain = FilterChain::new(vec![parent]);

        assert!(!chain.admit_path(Path::new("notes.txt")));
        assert_eq!(calls(&nested_calls), 0);
    }

    #[test]
    fn test_always_execute_filters_run_normally_while_admitted() {
        let (forced, forced_calls) = counting_node(false);
        let (later, later_calls) = counting_node(true);
        let chain = FilterChain::new(vec![always(forced), later]);

        assert!(!chain.admit_path(Path::new("a.xml")));
        assert_eq!(calls(&forced_calls), 1);
        assert_eq!(calls(&later_calls), 0);
    }

    #[test]
    fn test_errors_from_always_execute_filters_propagate() {
        let rejecting = FilterNode::content_query(&Namespaces::new(), "/Missing").unwrap();
        let broken = always(FilterNode::content_query(&Namespaces::new(), "no-such-function()").unwrap());
        let chain = FilterChain::new(vec![rejecting, broken]);

        let doc = XmlDocument::parse("<Test/>").unwrap();
        assert!(matches!(chain.admit_document(&doc), Err(FilterError::Evaluation { .. })));
    }

    #[test]
    fn test_describe_tree() {
        let chain = FilterChain::new(vec![
            FilterNode::path_name(r"\.xml$", PathMatchMode::FullPath)
                .unwrap()
                .with_nested_filter(FilterNode::content_query(&Namespaces::new(), "/Test").unwrap()),
            always(FilterNode::pass_through()),
        ]);

        assert_eq!(
            chain.describe_tree(),
            vec![
                r"path /\.xml$/".to_string(),
                "  content /Test".to_string(),
                "group [always]".to_string(),
            ]
        );
        assert!(chain.needs_document());
    }
}
