//! Predicate tree types.
//!
//! A [`Predicate`] describes a search intent as a tree of leaf conditions and
//! AND/OR composites. Trees are built by callers, passed once through
//! [`Predicate::optimize`], and the optimized tree is handed to a translator.
//!
//! ```rust
//! use sieve_query::Predicate;
//!
//! let tree = Predicate::and([
//!     Predicate::in_list("status", ["draft", "live"]),
//!     Predicate::in_list("status", ["live", "archived"]),
//! ]);
//!
//! let optimized = tree.optimize().unwrap();
//! assert_eq!(optimized, Predicate::in_list("status", ["live"]));
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::calendar::WorkingCalendar;
use crate::error::QueryResult;
use crate::optimize::Optimizer;
use crate::value::ScalarValue;

/// A field name.
pub type FieldName = SmolStr;

/// Comparison applied by [`Predicate::Value`] and [`Predicate::Keyword`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Not equal.
    NotEq,
    /// Tokenized text match.
    Like,
    /// Negated tokenized text match.
    NotLike,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Between the bounds of a list value.
    Between,
    /// Some term starts with the value.
    TermStartsWith,
    /// Some term ends with the value.
    TermEndsWith,
    /// Some term matches the wildcard pattern.
    TermWildcard,
}

/// Which side of a range a directional comparison bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// GE/GT: a lower bound.
    Greater,
    /// LE/LT: an upper bound.
    Lesser,
}

impl Direction {
    /// Get the name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greater => "greater",
            Self::Lesser => "lesser",
        }
    }
}

impl Comparison {
    /// Get the operator symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Between => "BETWEEN",
            Self::TermStartsWith => "STARTS_WITH",
            Self::TermEndsWith => "ENDS_WITH",
            Self::TermWildcard => "WILDCARD",
        }
    }

    /// The range side this comparison bounds, if it is directional.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Gt | Self::Ge => Some(Direction::Greater),
            Self::Lt | Self::Le => Some(Direction::Lesser),
            _ => None,
        }
    }

    /// Whether the comparison excludes its own value (GT/LT).
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Gt | Self::Lt)
    }
}

/// Comparison applied by [`Predicate::Day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayComparison {
    /// Same day.
    Eq,
    /// Any other day.
    NotEq,
    /// Strictly after the day.
    Gt,
    /// On or after the day.
    Ge,
    /// Strictly before the day.
    Lt,
    /// On or before the day.
    Le,
}

impl From<DayComparison> for Comparison {
    fn from(c: DayComparison) -> Self {
        match c {
            DayComparison::Eq => Self::Eq,
            DayComparison::NotEq => Self::NotEq,
            DayComparison::Gt => Self::Gt,
            DayComparison::Ge => Self::Ge,
            DayComparison::Lt => Self::Lt,
            DayComparison::Le => Self::Le,
        }
    }
}

/// Boolean operator of a composite predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Every operand must match.
    And,
    /// At least one operand must match.
    Or,
}

impl Operator {
    /// Get the operator keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// An AND/OR combination of operands.
///
/// The operator is optional because operations can be deserialized from
/// caller input; optimizing an operation without one is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The boolean operator.
    #[serde(default)]
    pub operator: Option<Operator>,
    /// The operands, in caller order.
    #[serde(default)]
    pub operands: Vec<Predicate>,
}

impl Operation {
    /// Create a new operation.
    pub fn new(operator: Operator, operands: impl IntoIterator<Item = Predicate>) -> Self {
        Self {
            operator: Some(operator),
            operands: operands.into_iter().collect(),
        }
    }
}

/// A node of the search-intent tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Compare a field to a scalar.
    Value {
        /// Field name.
        field: FieldName,
        /// Comparison.
        comparison: Comparison,
        /// Compared value.
        value: ScalarValue,
        /// Match the value as a phrase rather than as separate terms.
        #[serde(default)]
        match_phrase: bool,
    },
    /// Compare a field to a scalar without tokenization.
    Keyword {
        /// Field name.
        field: FieldName,
        /// Comparison.
        comparison: Comparison,
        /// Compared value.
        value: ScalarValue,
    },
    /// Inclusive range; an absent bound is open.
    Range {
        /// Field name.
        field: FieldName,
        /// Lower bound.
        min: Option<ScalarValue>,
        /// Upper bound.
        max: Option<ScalarValue>,
    },
    /// Compare a field against a calendar day.
    Day {
        /// Field name.
        field: FieldName,
        /// Comparison.
        comparison: DayComparison,
        /// The day; `None` places no constraint.
        day: Option<NaiveDate>,
    },
    /// Inclusive range of calendar days; an absent bound is open.
    DayRange {
        /// Field name.
        field: FieldName,
        /// First day.
        from: Option<NaiveDate>,
        /// Last day.
        until: Option<NaiveDate>,
    },
    /// Field value is a member of a fixed set.
    In {
        /// Field name.
        field: FieldName,
        /// Allowed values.
        values: Vec<ScalarValue>,
    },
    /// Field is (or is not) absent.
    IsNull {
        /// Field name.
        field: FieldName,
        /// `true` matches absent fields, `false` present ones.
        match_null: bool,
    },
    /// Unstructured match against the full-text field.
    Fulltext {
        /// Search text.
        text: String,
    },
    /// Typeahead request.
    Suggest {
        /// Prefix text.
        text: String,
        /// Maximum number of suggestions.
        count: usize,
    },
    /// Negation of a sub-tree.
    Not(Box<Predicate>),
    /// AND/OR composite.
    Operation(Operation),
    /// Matches every document.
    FindAll,
    /// Constant true.
    AlwaysTrue,
    /// Constant false.
    AlwaysFalse,
    /// No constraint.
    Empty,
}

impl Default for Predicate {
    fn default() -> Self {
        Self::Empty
    }
}

impl Predicate {
    // ============== Constructors ==============

    /// Compare a field to a value.
    pub fn value(
        field: impl Into<FieldName>,
        comparison: Comparison,
        value: impl Into<ScalarValue>,
    ) -> Self {
        Self::Value {
            field: field.into(),
            comparison,
            value: value.into(),
            match_phrase: false,
        }
    }

    /// Match a field against a phrase.
    pub fn phrase(field: impl Into<FieldName>, value: impl Into<ScalarValue>) -> Self {
        Self::Value {
            field: field.into(),
            comparison: Comparison::Like,
            value: value.into(),
            match_phrase: true,
        }
    }

    /// Compare a field to a value without tokenization.
    pub fn keyword(
        field: impl Into<FieldName>,
        comparison: Comparison,
        value: impl Into<ScalarValue>,
    ) -> Self {
        Self::Keyword {
            field: field.into(),
            comparison,
            value: value.into(),
        }
    }

    /// Inclusive range over a field.
    pub fn range(
        field: impl Into<FieldName>,
        min: Option<ScalarValue>,
        max: Option<ScalarValue>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            min,
            max,
        }
    }

    /// Compare a field against a calendar day.
    pub fn day(field: impl Into<FieldName>, comparison: DayComparison, day: Option<NaiveDate>) -> Self {
        Self::Day {
            field: field.into(),
            comparison,
            day,
        }
    }

    /// Compare a field against the day an instant falls on in `calendar`.
    pub fn day_at(
        field: impl Into<FieldName>,
        comparison: DayComparison,
        instant: Option<DateTime<Utc>>,
        calendar: &WorkingCalendar,
    ) -> Self {
        Self::day(field, comparison, instant.map(|i| calendar.day_of(i)))
    }

    /// Inclusive range of calendar days.
    pub fn day_range(
        field: impl Into<FieldName>,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Self {
        Self::DayRange {
            field: field.into(),
            from,
            until,
        }
    }

    /// Inclusive range between the days two instants fall on in `calendar`.
    pub fn day_range_at(
        field: impl Into<FieldName>,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        calendar: &WorkingCalendar,
    ) -> Self {
        Self::day_range(
            field,
            from.map(|i| calendar.day_of(i)),
            until.map(|i| calendar.day_of(i)),
        )
    }

    /// Membership in a set of values.
    pub fn in_list<V: Into<ScalarValue>>(
        field: impl Into<FieldName>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field is absent (`match_null = true`) or present.
    pub fn is_null(field: impl Into<FieldName>, match_null: bool) -> Self {
        Self::IsNull {
            field: field.into(),
            match_null,
        }
    }

    /// Full-text match.
    pub fn fulltext(text: impl Into<String>) -> Self {
        Self::Fulltext { text: text.into() }
    }

    /// Typeahead request.
    pub fn suggest(text: impl Into<String>, count: usize) -> Self {
        Self::Suggest {
            text: text.into(),
            count,
        }
    }

    /// Negate a predicate.
    pub fn negate(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    /// AND composite.
    pub fn and(operands: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Operation(Operation::new(Operator::And, operands))
    }

    /// OR composite.
    pub fn or(operands: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Operation(Operation::new(Operator::Or, operands))
    }

    // ============== Optimization ==============

    /// Produce the simplified, canonical equivalent of this tree.
    ///
    /// The result is a leaf, a single-level operation without redundant
    /// nesting, or one of the sentinels.
    pub fn optimize(self) -> QueryResult<Predicate> {
        Optimizer::default().optimize(self)
    }

    /// Apply the rule for a node that has no sub-tree.
    ///
    /// Composites and negations are returned unchanged; the optimizer
    /// handles them.
    pub(crate) fn optimize_leaf(self) -> Predicate {
        match self {
            Self::Value { ref value, .. } | Self::Keyword { ref value, .. } if value.is_blank() => {
                Self::Empty
            }
            Self::Range {
                min: None,
                max: None,
                ..
            } => Self::Empty,
            Self::Day { day: None, .. } => Self::Empty,
            Self::DayRange { field, from, until } => match (from, until) {
                (None, None) => Self::Empty,
                (Some(from), None) => Self::day(field, DayComparison::Ge, Some(from)),
                (None, Some(until)) => Self::day(field, DayComparison::Le, Some(until)),
                (Some(from), Some(until)) if from > until => Self::AlwaysFalse,
                (from, until) => Self::DayRange { field, from, until },
            },
            Self::In { ref values, .. } if values.is_empty() => Self::AlwaysFalse,
            Self::Fulltext { ref text } | Self::Suggest { ref text, .. } if text.trim().is_empty() => {
                Self::Empty
            }
            other => other,
        }
    }

    // ============== Inspection ==============

    /// Check if this is one of `AlwaysTrue`, `AlwaysFalse` or `Empty`.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::AlwaysTrue | Self::AlwaysFalse | Self::Empty)
    }

    /// Check if this node has no sub-tree.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Not(_) | Self::Operation(_))
    }

    /// The field a leaf constrains, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Value { field, .. }
            | Self::Keyword { field, .. }
            | Self::Range { field, .. }
            | Self::Day { field, .. }
            | Self::DayRange { field, .. }
            | Self::In { field, .. }
            | Self::IsNull { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Direct children of this node.
    pub fn children(&self) -> &[Predicate] {
        match self {
            Self::Not(inner) => std::slice::from_ref(inner.as_ref()),
            Self::Operation(op) => &op.operands,
            _ => &[],
        }
    }

    /// Number of levels in the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Predicate::depth).max().unwrap_or(0)
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Predicate::node_count).sum::<usize>()
    }

    /// Distinct field names referenced by the tree, in first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        let mut collector = crate::visit::FieldCollector::default();
        let _ = crate::visit::walk(self, &mut collector);
        collector.into_fields()
    }
}

fn write_bound<T: fmt::Display>(f: &mut fmt::Formatter<'_>, bound: &Option<T>) -> fmt::Result {
    match bound {
        Some(v) => write!(f, "{}", v),
        None => f.write_str("*"),
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value {
                field,
                comparison,
                value,
                match_phrase,
            } => {
                if *match_phrase {
                    write!(f, "{} {} PHRASE {}", field, comparison.as_str(), value)
                } else {
                    write!(f, "{} {} {}", field, comparison.as_str(), value)
                }
            }
            Self::Keyword {
                field,
                comparison,
                value,
            } => write!(f, "KEYWORD({} {} {})", field, comparison.as_str(), value),
            Self::Range { field, min, max } => {
                write!(f, "RANGE({}, ", field)?;
                write_bound(f, min)?;
                f.write_str("..")?;
                write_bound(f, max)?;
                f.write_str(")")
            }
            Self::Day {
                field,
                comparison,
                day,
            } => {
                write!(f, "DAY({} {} ", field, Comparison::from(*comparison).as_str())?;
                match day {
                    Some(d) => write!(f, "{})", d.format("%Y-%m-%d")),
                    None => f.write_str("null)"),
                }
            }
            Self::DayRange { field, from, until } => {
                write!(f, "DAY_RANGE({}, ", field)?;
                write_bound(f, &from.map(|d| d.format("%Y-%m-%d")))?;
                f.write_str("..")?;
                write_bound(f, &until.map(|d| d.format("%Y-%m-%d")))?;
                f.write_str(")")
            }
            Self::In { field, values } => {
                write!(f, "IN({}, [", field)?;
                write_list(f, values)?;
                f.write_str("])")
            }
            Self::IsNull { field, match_null } => {
                if *match_null {
                    write!(f, "{} IS NULL", field)
                } else {
                    write!(f, "{} IS NOT NULL", field)
                }
            }
            Self::Fulltext { text } => write!(f, "FULLTEXT({:?})", text),
            Self::Suggest { text, count } => write!(f, "SUGGEST({:?}, {})", text, count),
            Self::Not(inner) => write!(f, "NOT({})", inner),
            Self::Operation(op) => {
                let keyword = op.operator.map_or("?", |o| o.as_str());
                write!(f, "{}(", keyword)?;
                write_list(f, &op.operands)?;
                f.write_str(")")
            }
            Self::FindAll => f.write_str("FIND_ALL"),
            Self::AlwaysTrue => f.write_str("TRUE"),
            Self::AlwaysFalse => f.write_str("FALSE"),
            Self::Empty => f.write_str("EMPTY"),
        }
    }
}
