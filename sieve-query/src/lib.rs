//! # sieve-query
//!
//! Predicate trees and their optimizer.
//!
//! Callers describe a search intent as a tree of [`Predicate`] nodes: field
//! comparisons, ranges, set membership, negation, day-granularity date
//! matching, free text and typeahead, combined with AND/OR. Before the tree
//! reaches a backend translator, [`Predicate::optimize`] rewrites it into a
//! simplified equivalent:
//!
//! - constant sub-trees collapse into `AlwaysTrue` / `AlwaysFalse`
//! - same-operator nesting is flattened
//! - membership tests on one field merge into a single set
//! - lower and upper date bounds on one field merge into a range
//!
//! ## Building predicates
//!
//! ```rust
//! use sieve_query::{Comparison, Predicate};
//!
//! let tree = Predicate::and([
//!     Predicate::value("title", Comparison::Like, "rust"),
//!     Predicate::in_list("status", ["draft", "live"]),
//!     Predicate::negate(Predicate::is_null("author", true)),
//! ]);
//! assert_eq!(tree.fields(), vec!["title", "status", "author"]);
//! ```
//!
//! The [`builder`] module and the [`predicate!`], [`and!`] and [`or!`] macros
//! offer shorter forms:
//!
//! ```rust
//! use sieve_query::{and, predicate};
//!
//! let tree = and!(predicate!(views >= 100), predicate!(status in ["live"]));
//! assert_eq!(tree.to_string(), "AND(views >= 100, IN(status, [\"live\"]))");
//! ```
//!
//! ## Optimizing
//!
//! ```rust
//! use sieve_query::Predicate;
//!
//! let tree = Predicate::or([
//!     Predicate::in_list("status", ["draft"]),
//!     Predicate::or([Predicate::in_list("status", ["live"]), Predicate::Empty]),
//! ]);
//!
//! assert_eq!(
//!     tree.optimize().unwrap(),
//!     Predicate::in_list("status", ["draft", "live"]),
//! );
//! ```
//!
//! Consumers treat `Empty` and `AlwaysTrue` as "no filter" and `AlwaysFalse`
//! as "no results"; [`outcome::plan`] does that dispatch for a
//! [`outcome::PredicateTranslator`].
//!
//! ## Configuration
//!
//! [`SieveConfig`] is loaded from `sieve.toml` and carries the working
//! calendar used for day truncation, the full-text field and debug settings.

pub mod builder;
pub mod calendar;
pub mod config;
pub mod error;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod optimize;
pub mod outcome;
pub mod predicate;
pub mod set_ops;
pub mod value;
pub mod visit;

pub use calendar::WorkingCalendar;
pub use config::SieveConfig;
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use optimize::Optimizer;
pub use outcome::{FilterOutcome, Plan, PredicateTranslator, plan};
pub use predicate::{
    Comparison, DayComparison, Direction, FieldName, Operation, Operator, Predicate,
};
pub use value::{ScalarValue, ValueKind};

pub use logging::{get_log_format, get_log_level, init as init_logging, is_debug_enabled};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{AndBuilder, OrBuilder};
    pub use crate::calendar::WorkingCalendar;
    pub use crate::config::SieveConfig;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::optimize::Optimizer;
    pub use crate::outcome::{FilterOutcome, Plan, PredicateTranslator, plan};
    pub use crate::predicate::{Comparison, DayComparison, Operator, Predicate};
    pub use crate::value::ScalarValue;
    pub use crate::{and, or, predicate};
}
