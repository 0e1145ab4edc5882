//! # Sieve
//!
//! Canonicalizing optimizer for search predicate trees.
//!
//! Sieve provides:
//! - A predicate tree model for search intents (comparisons, ranges, set
//!   membership, day matching, full text, typeahead)
//! - An optimizer that collapses constants, flattens nesting and merges
//!   predicates on the same field
//! - A translator seam that keeps sentinels away from backend code
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//!
//! let tree = Predicate::and([
//!     predicate!(status in ["draft", "live"]),
//!     Predicate::and([predicate!(status in ["live", "gone"]), Predicate::AlwaysTrue]),
//! ]);
//!
//! assert_eq!(tree.optimize()?, predicate!(status in ["live"]));
//! # Ok::<(), QueryError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Predicate trees, the optimizer and their support modules.
pub mod query {
    pub use sieve_query::*;
}

pub use sieve_query::{and, or, predicate};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_query::prelude::*;
}

// Re-export key types at the crate root
pub use sieve_query::{Optimizer, Predicate, QueryError, QueryResult, SieveConfig};
