//! Predicate construction macros.
//!
//! # Examples
//!
//! ```rust
//! use sieve_query::{predicate, and, or};
//! use sieve_query::Predicate;
//!
//! let p = predicate!(views > 100);
//! assert!(matches!(p, Predicate::Value { .. }));
//!
//! let tree = and!(
//!     predicate!(status in ["live", "archived"]),
//!     or!(predicate!(author == "ada"), predicate!(editor is not null)),
//! );
//! assert_eq!(tree.node_count(), 5);
//! ```

/// Create a leaf predicate.
///
/// # Syntax
///
/// - `predicate!(field == value)` - Equality
/// - `predicate!(field != value)` - Not equals
/// - `predicate!(field > value)` - Greater than
/// - `predicate!(field >= value)` - Greater than or equal
/// - `predicate!(field < value)` - Less than
/// - `predicate!(field <= value)` - Less than or equal
/// - `predicate!(field contains value)` - Tokenized text match
/// - `predicate!(field is null)` - Field absent
/// - `predicate!(field is not null)` - Field present
/// - `predicate!(field in [v1, v2, ...])` - Membership
/// - `predicate!(field not in [v1, v2, ...])` - Negated membership
///
/// # Examples
///
/// ```rust
/// use sieve_query::predicate;
/// use sieve_query::{Comparison, Predicate};
///
/// assert_eq!(predicate!(age >= 18), Predicate::value("age", Comparison::Ge, 18));
/// assert_eq!(predicate!(deleted_at is null), Predicate::is_null("deleted_at", true));
/// assert_eq!(predicate!(id in [1, 2]), Predicate::in_list("id", [1, 2]));
/// ```
#[macro_export]
macro_rules! predicate {
    ($field:ident == $value:expr) => {
        $crate::predicate!(@cmp $field, Eq, $value)
    };
    ($field:ident != $value:expr) => {
        $crate::predicate!(@cmp $field, NotEq, $value)
    };
    ($field:ident > $value:expr) => {
        $crate::predicate!(@cmp $field, Gt, $value)
    };
    ($field:ident >= $value:expr) => {
        $crate::predicate!(@cmp $field, Ge, $value)
    };
    ($field:ident < $value:expr) => {
        $crate::predicate!(@cmp $field, Lt, $value)
    };
    ($field:ident <= $value:expr) => {
        $crate::predicate!(@cmp $field, Le, $value)
    };
    ($field:ident contains $value:expr) => {
        $crate::predicate!(@cmp $field, Like, $value)
    };

    ($field:ident is null) => {
        $crate::predicate::Predicate::is_null(stringify!($field), true)
    };
    ($field:ident is not null) => {
        $crate::predicate::Predicate::is_null(stringify!($field), false)
    };

    ($field:ident in [$($value:expr),* $(,)?]) => {
        $crate::predicate::Predicate::In {
            field: stringify!($field).into(),
            values: ::std::vec![$($crate::value::ScalarValue::from($value)),*],
        }
    };
    ($field:ident not in [$($value:expr),* $(,)?]) => {
        $crate::predicate::Predicate::negate($crate::predicate!($field in [$($value),*]))
    };

    (@cmp $field:ident, $comparison:ident, $value:expr) => {
        $crate::predicate::Predicate::value(
            stringify!($field),
            $crate::predicate::Comparison::$comparison,
            $value,
        )
    };
}

/// Combine predicates with AND.
///
/// ```rust
/// use sieve_query::{and, predicate};
///
/// let tree = and!(predicate!(a == 1), predicate!(b == 2));
/// assert_eq!(tree.children().len(), 2);
/// ```
#[macro_export]
macro_rules! and {
    ($($operand:expr),* $(,)?) => {
        $crate::predicate::Predicate::and([$($operand),*])
    };
}

/// Combine predicates with OR.
#[macro_export]
macro_rules! or {
    ($($operand:expr),* $(,)?) => {
        $crate::predicate::Predicate::or([$($operand),*])
    };
}

#[cfg(test)]
mod tests {
    use crate::predicate::{Comparison, Predicate};
    use crate::value::ScalarValue;

    #[test]
    fn test_comparisons() {
        assert_eq!(predicate!(a == 1), Predicate::value("a", Comparison::Eq, 1));
        assert_eq!(predicate!(a != "x"), Predicate::value("a", Comparison::NotEq, "x"));
        assert_eq!(predicate!(a < 2.5), Predicate::value("a", Comparison::Lt, 2.5));
        assert_eq!(
            predicate!(title contains "rust"),
            Predicate::value("title", Comparison::Like, "rust")
        );
    }

    #[test]
    fn test_membership_accepts_mixed_values() {
        assert_eq!(
            predicate!(f in [1, "one"]),
            Predicate::In {
                field: "f".into(),
                values: vec![ScalarValue::Int(1), ScalarValue::String("one".into())],
            }
        );
        assert_eq!(
            predicate!(f not in [1]),
            Predicate::negate(Predicate::in_list("f", [1]))
        );
    }

    #[test]
    fn test_composites() {
        let tree = or!(predicate!(a is null), and!(predicate!(b == true)));
        assert_eq!(
            tree,
            Predicate::or([
                Predicate::is_null("a", true),
                Predicate::and([Predicate::value("b", Comparison::Eq, true)]),
            ])
        );
    }
}
