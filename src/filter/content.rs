use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use sxd_xpath::{Context, Factory, Value, XPath};

use super::error::FilterError;
use crate::document::XmlDocument;

/// Namespace prefix to URI bindings visible to a content query
pub type Namespaces = BTreeMap<String, String>;

/// Prefix that XPath binds implicitly
const XML_PREFIX: &str = "xml";

lazy_static! {
    static ref STRING_LITERAL: Regex =
        Regex::new(r#""[^"]*"|'[^']*'"#).expect("string literal regex is valid");

    /// `prefix:name` or `prefix:*`, including after an axis separator
    static ref QNAME_PREFIX: Regex = Regex::new(r"(?:^|::|[^\w:.\-$])([A-Za-z_][\w.\-]*):[A-Za-z_*]")
        .expect("qualified name regex is valid");
}

/// Content Filter - XPath test applied to a parsed document
///
/// The query is compiled once at construction. A document passes the
/// intrinsic test when the query yields a non-empty result: at least one node
/// for a node-set, or any scalar value.
pub struct ContentQuery {
    query: String,
    namespaces: Namespaces,
    xpath: XPath,
}

impl ContentQuery {
    pub fn new(namespaces: &Namespaces, query: &str) -> Result<Self, FilterError> {
        let compile_error = |reason: String| FilterError::QueryCompile {
            query: query.to_string(),
            reason,
        };

        let xpath = Factory::new()
            .build(query)
            .map_err(|e| compile_error(e.to_string()))?
            .ok_or_else(|| compile_error("expression is empty".to_string()))?;

        if let Some(prefix) = undeclared_prefix(query, namespaces) {
            return Err(compile_error(format!("namespace prefix '{prefix}' is not bound")));
        }

        tracing::debug!(
            "Compiled content query '{}' with {} namespace binding(s)",
            query,
            namespaces.len()
        );

        Ok(Self {
            query: query.to_string(),
            namespaces: namespaces.clone(),
            xpath,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Intrinsic test for the post-parse phase
    pub fn matches(&self, document: &XmlDocument) -> Result<bool, FilterError> {
        let mut context = Context::new();
        for (prefix, uri) in &self.namespaces {
            context.set_namespace(prefix, uri);
        }

        let dom = document.dom();
        let value = self
            .xpath
            .evaluate(&context, dom.root())
            .map_err(|e| FilterError::Evaluation {
                query: self.query.clone(),
                reason: e.to_string(),
            })?;

        Ok(match value {
            Value::Nodeset(nodes) => nodes.size() > 0,
            Value::Boolean(_) | Value::Number(_) | Value::String(_) => true,
        })
    }
}

impl fmt::Debug for ContentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentQuery")
            .field("query", &self.query)
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

/// First prefix used by `query` that has no binding
fn undeclared_prefix(query: &str, namespaces: &Namespaces) -> Option<String> {
    let without_literals = STRING_LITERAL.replace_all(query, "''");

    QNAME_PREFIX
        .captures_iter(&without_literals)
        .map(|caps| caps[1].to_string())
        .find(|prefix| prefix != XML_PREFIX && !namespaces.contains_key(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_namespaces() -> Namespaces {
        Namespaces::from([("a".to_string(), "http://example.com".to_string())])
    }

    fn matches(query: &ContentQuery, xml: &str) -> bool {
        let doc = XmlDocument::parse(xml).unwrap();
        query.matches(&doc).unwrap()
    }

    #[test]
    fn test_root_element_query() {
        let query = ContentQuery::new(&Namespaces::new(), "/Test").unwrap();

        assert!(matches(&query, r#"<Test><Nested attr="Value">Text</Nested></Test>"#));
        assert!(matches(&query, "<Test/>"));
        assert!(!matches(&query, "<Test2/>"));
        assert!(!matches(&query, "<Test2><Test/></Test2>"));
    }

    #[test]
    fn test_namespaced_query() {
        let query = ContentQuery::new(&example_namespaces(), "/a:Test").unwrap();

        assert!(matches(&query, r#"<a:Test xmlns:a="http://example.com"/>"#));
        assert!(matches(&query, r#"<Test xmlns="http://example.com"/>"#));
        assert!(!matches(&query, "<Test/>"));
        assert!(!matches(&query, r#"<a:Test xmlns:a="http://elsewhere.com"/>"#));
    }

    #[test]
    fn test_scalar_results_count_as_match() {
        let query = ContentQuery::new(&Namespaces::new(), "count(/Missing)").unwrap();
        assert!(matches(&query, "<Test/>"));
    }

    #[test]
    fn test_invalid_syntax_fails_construction() {
        let err = ContentQuery::new(&Namespaces::new(), "/Test[").unwrap_err();
        assert!(matches!(err, FilterError::QueryCompile { ref query, .. } if query == "/Test["));
    }

    #[test]
    fn test_empty_query_fails_construction() {
        let err = ContentQuery::new(&Namespaces::new(), "").unwrap_err();
        assert!(matches!(err, FilterError::QueryCompile { .. }));
    }

    #[test]
    fn test_unbound_prefix_fails_construction() {
        let err = ContentQuery::new(&Namespaces::new(), "/a:Test").unwrap_err();
        assert!(err.to_string().contains("'a'"));

        let err = ContentQuery::new(&example_namespaces(), "/a:Test/child::b:Item").unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_prefix_scan_skips_literals_and_axes() {
        let namespaces = Namespaces::new();
        assert_eq!(undeclared_prefix("/Test[@href = 'http://example.com']", &namespaces), None);
        assert_eq!(undeclared_prefix("/descendant-or-self::node()/child::Test", &namespaces), None);
        assert_eq!(undeclared_prefix("/Test/@xml:lang", &namespaces), None);
        assert_eq!(undeclared_prefix("//x:*", &namespaces), Some("x".to_string()));
    }

    #[test]
    fn test_runtime_failure_is_surfaced() {
        let query = ContentQuery::new(&Namespaces::new(), "no-such-function(/Test)").unwrap();
        let doc = XmlDocument::parse("<Test/>").unwrap();

        let err = query.matches(&doc).unwrap_err();
        assert!(matches!(err, FilterError::Evaluation { ref query, .. } if query == "no-such-function(/Test)"));
        assert!(!err.is_construction());
    }
}
