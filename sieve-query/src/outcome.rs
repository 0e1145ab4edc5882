//! Hand-off between the optimizer and backend translators.
//!
//! Translators never see sentinels: [`plan`] optimizes the tree and resolves
//! `Empty` / `AlwaysTrue` / `FindAll` to a match-all query and `AlwaysFalse`
//! to no query at all.
//!
//! ```rust
//! use sieve_query::{Predicate, QueryResult};
//! use sieve_query::outcome::{plan, Plan, PredicateTranslator};
//!
//! struct Text;
//!
//! impl PredicateTranslator for Text {
//!     type Output = String;
//!
//!     fn translate(&self, predicate: &Predicate) -> QueryResult<String> {
//!         Ok(predicate.to_string())
//!     }
//!
//!     fn match_all(&self) -> String {
//!         "*".to_string()
//!     }
//! }
//!
//! let skipped = plan(Predicate::in_list("id", Vec::<i64>::new()), &Text).unwrap();
//! assert_eq!(skipped, Plan::Skip);
//!
//! let query = plan(Predicate::and([Predicate::fulltext("rust")]), &Text).unwrap();
//! assert_eq!(query, Plan::Query("FULLTEXT(\"rust\")".to_string()));
//! ```

use tracing::debug;

use crate::error::QueryResult;
use crate::predicate::Predicate;

/// What an optimized tree asks of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Every document matches.
    NoFilter,
    /// No document can match; the backend need not be queried.
    NoResults,
    /// Filter with the given tree.
    Filter(Predicate),
}

impl FilterOutcome {
    /// Check if the backend must be queried.
    pub fn needs_query(&self) -> bool {
        !matches!(self, Self::NoResults)
    }
}

impl Predicate {
    /// Classify an optimized tree.
    pub fn into_outcome(self) -> FilterOutcome {
        match self {
            Self::Empty | Self::AlwaysTrue | Self::FindAll => FilterOutcome::NoFilter,
            Self::AlwaysFalse => FilterOutcome::NoResults,
            other => FilterOutcome::Filter(other),
        }
    }
}

impl From<Predicate> for FilterOutcome {
    fn from(predicate: Predicate) -> Self {
        predicate.into_outcome()
    }
}

/// Turns optimized trees into backend queries.
pub trait PredicateTranslator {
    /// The backend query type.
    type Output;

    /// Translate a non-sentinel tree.
    fn translate(&self, predicate: &Predicate) -> QueryResult<Self::Output>;

    /// A query matching every document.
    fn match_all(&self) -> Self::Output;
}

/// Result of [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan<O> {
    /// Nothing can match; skip the backend.
    Skip,
    /// Run this query.
    Query(O),
}

impl<O> Plan<O> {
    /// Get the query, if any.
    pub fn into_query(self) -> Option<O> {
        match self {
            Self::Skip => None,
            Self::Query(query) => Some(query),
        }
    }
}

/// Optimize `predicate` and hand it to `translator`.
pub fn plan<T: PredicateTranslator>(
    predicate: Predicate,
    translator: &T,
) -> QueryResult<Plan<T::Output>> {
    match predicate.optimize()?.into_outcome() {
        FilterOutcome::NoResults => {
            debug!("predicate can never match, skipping backend");
            Ok(Plan::Skip)
        }
        FilterOutcome::NoFilter => Ok(Plan::Query(translator.match_all())),
        FilterOutcome::Filter(tree) => translator.translate(&tree).map(Plan::Query),
    }
}
