use thiserror::Error;

/// Errors raised while building or evaluating filter nodes
#[derive(Error, Debug)]
pub enum FilterError {
    /// The path filter's regular expression did not compile
    #[error("invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The content filter's XPath did not compile against its namespace bindings
    #[error("invalid content query '{query}': {reason}")]
    QueryCompile { query: String, reason: String },

    /// The content filter's XPath failed while running against a document
    #[error("content query '{query}' failed: {reason}")]
    Evaluation { query: String, reason: String },
}

impl FilterError {
    /// True for errors raised while a node is being built
    pub fn is_construction(&self) -> bool {
        matches!(self, FilterError::Pattern { .. } | FilterError::QueryCompile { .. })
    }
}
