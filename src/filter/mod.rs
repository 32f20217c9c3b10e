//! Filter tree - decides whether a candidate document is considered at all
//!
//! Filters run in two phases to keep rejected candidates cheap:
//!
//! 1. **Path phase** - regex tests on the candidate path, before any I/O
//! 2. **Document phase** - XPath tests on the parsed document, only for
//!    candidates that survived the path phase
//!
//! Every filter is a [`FilterNode`]: an intrinsic [`Predicate`] plus an
//! ordered list of nested filters that must all agree. A predicate that does
//! not belong to the phase being evaluated passes vacuously, so a path filter
//! can host content filters and the other way round.
//!
//! ```text
//! path /\.xml$/
//! └── path /invoice/
//!     └── content /inv:Invoice[inv:Total > 0]
//! ```

pub mod content;
pub mod error;
pub mod node;
pub mod path;

pub use content::{ContentQuery, Namespaces};
pub use error::FilterError;
pub use node::{FilterNode, Predicate};
pub use path::{PathMatchMode, PathNameMatcher};
