//! Short-hand predicate constructors.
//!
//! Free functions mirror the [`Predicate`] constructors with shorter names,
//! and [`AndBuilder`] / [`OrBuilder`] collect operands incrementally.
//!
//! Nothing here simplifies: the trees are built exactly as written and left
//! for [`Predicate::optimize`].
//!
//! ```rust
//! use sieve_query::builder::{and, eq, gt, in_list, not};
//!
//! let tree = and([
//!     eq("kind", "article"),
//!     gt("views", 100),
//!     not(in_list("status", ["draft"])),
//! ]);
//! assert_eq!(tree.depth(), 3);
//! ```

use chrono::NaiveDate;

use crate::predicate::{Comparison, DayComparison, FieldName, Operation, Operator, Predicate};
use crate::value::ScalarValue;

// ============================================================================
// Leaf constructors
// ============================================================================

/// Equality.
#[inline]
pub fn eq(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::Eq, value)
}

/// Inequality.
#[inline]
pub fn ne(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::NotEq, value)
}

/// Greater than.
#[inline]
pub fn gt(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::Gt, value)
}

/// Greater than or equal.
#[inline]
pub fn ge(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::Ge, value)
}

/// Less than.
#[inline]
pub fn lt(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::Lt, value)
}

/// Less than or equal.
#[inline]
pub fn le(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::Le, value)
}

/// Tokenized text match.
#[inline]
pub fn like(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::value(field, Comparison::Like, value)
}

/// Phrase match.
#[inline]
pub fn phrase(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::phrase(field, value)
}

/// Untokenized equality.
#[inline]
pub fn keyword(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Predicate {
    Predicate::keyword(field, Comparison::Eq, value)
}

/// Membership.
#[inline]
pub fn in_list<V: Into<ScalarValue>>(
    field: impl Into<FieldName>,
    values: impl IntoIterator<Item = V>,
) -> Predicate {
    Predicate::in_list(field, values)
}

/// Negated membership.
#[inline]
pub fn not_in<V: Into<ScalarValue>>(
    field: impl Into<FieldName>,
    values: impl IntoIterator<Item = V>,
) -> Predicate {
    Predicate::negate(Predicate::in_list(field, values))
}

/// Field is absent.
#[inline]
pub fn is_null(field: impl Into<FieldName>) -> Predicate {
    Predicate::is_null(field, true)
}

/// Field is present.
#[inline]
pub fn is_not_null(field: impl Into<FieldName>) -> Predicate {
    Predicate::is_null(field, false)
}

/// Inclusive range; `None` leaves a side open.
#[inline]
pub fn range<V: Into<ScalarValue>>(
    field: impl Into<FieldName>,
    min: Option<V>,
    max: Option<V>,
) -> Predicate {
    Predicate::range(field, min.map(Into::into), max.map(Into::into))
}

/// Day comparison.
#[inline]
pub fn day(field: impl Into<FieldName>, comparison: DayComparison, day: NaiveDate) -> Predicate {
    Predicate::day(field, comparison, Some(day))
}

/// Inclusive day range.
#[inline]
pub fn day_range(
    field: impl Into<FieldName>,
    from: Option<NaiveDate>,
    until: Option<NaiveDate>,
) -> Predicate {
    Predicate::day_range(field, from, until)
}

/// Full-text match.
#[inline]
pub fn fulltext(text: impl Into<String>) -> Predicate {
    Predicate::fulltext(text)
}

/// Typeahead request.
#[inline]
pub fn suggest(text: impl Into<String>, count: usize) -> Predicate {
    Predicate::suggest(text, count)
}

/// Match every document.
#[inline]
pub const fn find_all() -> Predicate {
    Predicate::FindAll
}

// ============================================================================
// Combinators
// ============================================================================

/// Negation.
#[inline]
pub fn not(predicate: Predicate) -> Predicate {
    Predicate::negate(predicate)
}

/// AND of the operands.
#[inline]
pub fn and(operands: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::and(operands)
}

/// OR of the operands.
#[inline]
pub fn or(operands: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::or(operands)
}

/// AND of exactly two operands.
#[inline]
pub fn and2(a: Predicate, b: Predicate) -> Predicate {
    Predicate::and([a, b])
}

/// OR of exactly two operands.
#[inline]
pub fn or2(a: Predicate, b: Predicate) -> Predicate {
    Predicate::or([a, b])
}

// ============================================================================
// Incremental builders
// ============================================================================

macro_rules! operation_builder {
    ($name:ident, $operator:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            operands: Vec<Predicate>,
        }

        impl $name {
            /// Create an empty builder.
            pub fn new() -> Self {
                Self::default()
            }

            /// Create a builder with room for `capacity` operands.
            pub fn with_capacity(capacity: usize) -> Self {
                Self {
                    operands: Vec::with_capacity(capacity),
                }
            }

            /// Add an operand.
            pub fn push(mut self, predicate: Predicate) -> Self {
                self.operands.push(predicate);
                self
            }

            /// Add an operand if present.
            pub fn push_if_some(mut self, predicate: Option<Predicate>) -> Self {
                if let Some(predicate) = predicate {
                    self.operands.push(predicate);
                }
                self
            }

            /// Add an operand when `condition` holds.
            pub fn push_when(self, condition: bool, predicate: impl FnOnce() -> Predicate) -> Self {
                if condition { self.push(predicate()) } else { self }
            }

            /// Number of operands collected so far.
            pub fn len(&self) -> usize {
                self.operands.len()
            }

            /// Check if no operand was added.
            pub fn is_empty(&self) -> bool {
                self.operands.is_empty()
            }

            /// Build the composite.
            pub fn build(self) -> Predicate {
                Predicate::Operation(Operation::new($operator, self.operands))
            }
        }

        impl Extend<Predicate> for $name {
            fn extend<I: IntoIterator<Item = Predicate>>(&mut self, iter: I) {
                self.operands.extend(iter);
            }
        }
    };
}

operation_builder!(AndBuilder, Operator::And, "Collects the operands of an AND.");
operation_builder!(OrBuilder, Operator::Or, "Collects the operands of an OR.");

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_leaf_shorthands() {
        assert_eq!(eq("a", 1), Predicate::value("a", Comparison::Eq, 1));
        assert_eq!(le("a", 1), Predicate::value("a", Comparison::Le, 1));
        assert_eq!(keyword("sku", "X"), Predicate::keyword("sku", Comparison::Eq, "X"));
        assert_eq!(is_not_null("x"), Predicate::is_null("x", false));
        assert_eq!(
            not_in("f", [1]),
            Predicate::negate(Predicate::in_list("f", [1]))
        );
        assert_eq!(
            range("p", Some(1), None),
            Predicate::range("p", Some(ScalarValue::Int(1)), None)
        );
    }

    #[test]
    fn test_builders_keep_operands_verbatim() {
        let tree = AndBuilder::with_capacity(3)
            .push(eq("a", 1))
            .push_if_some(None)
            .push_if_some(Some(Predicate::Empty))
            .push_when(false, || eq("never", 0))
            .build();

        assert_eq!(tree, Predicate::and([eq("a", 1), Predicate::Empty]));
    }

    #[test]
    fn test_empty_builder() {
        let builder = OrBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.build(), Predicate::or(Vec::new()));
    }

    #[test]
    fn test_builder_extend() {
        let mut builder = OrBuilder::new();
        builder.extend([eq("a", 1), eq("b", 2)]);
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.build().optimize().unwrap(), or2(eq("a", 1), eq("b", 2)));
    }
}
