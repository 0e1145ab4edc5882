//! Predicate tree optimizer.
//!
//! [`Optimizer::optimize`] rewrites a tree into a simplified equivalent:
//!
//! - constant sub-trees collapse into `AlwaysTrue` / `AlwaysFalse`
//! - nested composites with the same operator are flattened
//! - `In` / `NOT In` predicates on one field merge into a single set
//! - lower and upper date bounds on one field (under AND) become a range
//! - composites left with a single operand are unwrapped
//!
//! Merge maps are keyed by the normalized field name (trimmed, lower-cased).
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sieve_query::{Predicate, Comparison};
//!
//! let from = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let until = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
//!
//! let tree = Predicate::and([
//!     Predicate::value("published", Comparison::Ge, from),
//!     Predicate::value("published", Comparison::Le, until),
//! ]);
//!
//! assert_eq!(
//!     tree.optimize().unwrap(),
//!     Predicate::range("published", Some(from.into()), Some(until.into())),
//! );
//! ```

use std::collections::VecDeque;
use std::ops::ControlFlow;

use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::SieveConfig;
use crate::error::{QueryError, QueryResult};
use crate::predicate::{Comparison, Direction, FieldName, Operation, Operator, Predicate};
use crate::set_ops::{intersect, union};
use crate::value::{ScalarValue, common_kind};

/// Rewrites predicate trees into their canonical form.
///
/// The optimizer holds no state between calls; one instance can be shared
/// across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Optimizer {
    log_rewrites: bool,
}

impl Optimizer {
    /// Create an optimizer from configuration.
    pub fn new(config: &SieveConfig) -> Self {
        Self {
            log_rewrites: config.debug.log_rewrites,
        }
    }

    /// Enable or disable per-operand tracing.
    pub fn with_log_rewrites(mut self, enabled: bool) -> Self {
        self.log_rewrites = enabled;
        self
    }

    /// Optimize a tree.
    ///
    /// Fails if a composite has no operator, or if an AND carries two lower
    /// (or two upper) date bounds for the same field.
    pub fn optimize(&self, predicate: Predicate) -> QueryResult<Predicate> {
        match predicate {
            Predicate::Operation(operation) => self.optimize_operation(operation),
            Predicate::Not(inner) => Ok(negate(self.optimize(*inner)?)),
            leaf => Ok(leaf.optimize_leaf()),
        }
    }

    fn optimize_operation(&self, operation: Operation) -> QueryResult<Predicate> {
        let Operation { operator, operands } = operation;
        let operator = operator.ok_or_else(QueryError::missing_operator)?;

        if operands.is_empty() {
            return Ok(Predicate::Empty);
        }

        let received = operands.len();
        let mut queue: VecDeque<(Predicate, bool)> =
            operands.into_iter().map(|p| (p, false)).collect();
        let mut acc = Accumulator::new(operator);

        while let Some((operand, optimized)) = queue.pop_front() {
            let operand = if optimized {
                operand
            } else {
                self.optimize(operand)?
            };

            if self.log_rewrites {
                trace!(operator = operator.as_str(), operand = %operand, "classifying operand");
            }

            match operand {
                Predicate::Operation(nested) if nested.operator == Some(operator) => {
                    queue.extend(nested.operands.into_iter().map(|p| (p, true)));
                }
                other => {
                    if let ControlFlow::Break(result) = acc.absorb(other)? {
                        debug!(operator = operator.as_str(), result = %result, "composite short-circuited");
                        return Ok(result);
                    }
                }
            }
        }

        let result = acc.finish();
        let kept = match &result {
            Predicate::Operation(operation) => operation.operands.len(),
            _ => 1,
        };
        if kept != received {
            debug!(operator = operator.as_str(), received, kept, "composite rewritten");
        }
        if self.log_rewrites {
            trace!(operator = operator.as_str(), result = %result, "composite result");
        }
        Ok(result)
    }
}

/// Negation of an already optimized predicate.
fn negate(inner: Predicate) -> Predicate {
    match inner {
        Predicate::Empty => Predicate::Empty,
        Predicate::AlwaysTrue => Predicate::AlwaysFalse,
        Predicate::AlwaysFalse => Predicate::AlwaysTrue,
        other => Predicate::Not(Box::new(other)),
    }
}

/// Lower-cased, trimmed field name used as merge-map key.
pub fn normalize_field(field: &str) -> String {
    field.trim().to_lowercase()
}

/// A set of values accumulated for one field.
#[derive(Debug)]
struct MemberSet {
    field: FieldName,
    values: Vec<ScalarValue>,
}

impl MemberSet {
    fn accepts(&self, values: &[ScalarValue]) -> bool {
        if self.values.is_empty() || values.is_empty() {
            return true;
        }
        match common_kind(&self.values) {
            Some(kind) => common_kind(values) == Some(kind),
            None => false,
        }
    }

    fn into_predicate(self, negated: bool) -> Predicate {
        let set = Predicate::In {
            field: self.field,
            values: self.values,
        }
        .optimize_leaf();
        if negated { negate(set) } else { set }
    }
}

/// One side of a range awaiting its counterpart.
#[derive(Debug)]
struct Bound<T> {
    field: FieldName,
    value: T,
    exclusive: bool,
    original: Predicate,
}

type BoundMap<T> = IndexMap<String, Bound<T>>;

/// State threaded through the flattening of one composite.
#[derive(Debug)]
struct Accumulator {
    operator: Operator,
    plain: Vec<Predicate>,
    members: IndexMap<String, MemberSet>,
    non_members: IndexMap<String, MemberSet>,
    greater: BoundMap<ScalarValue>,
    lesser: BoundMap<ScalarValue>,
    day_greater: BoundMap<NaiveDate>,
    day_lesser: BoundMap<NaiveDate>,
    saw_true: bool,
    saw_false: bool,
}

impl Accumulator {
    fn new(operator: Operator) -> Self {
        Self {
            operator,
            plain: Vec::new(),
            members: IndexMap::new(),
            non_members: IndexMap::new(),
            greater: IndexMap::new(),
            lesser: IndexMap::new(),
            day_greater: IndexMap::new(),
            day_lesser: IndexMap::new(),
            saw_true: false,
            saw_false: false,
        }
    }

    /// Apply the sentinel rules. Returns `None` if `predicate` is not a sentinel.
    fn absorb_constant(&mut self, predicate: &Predicate) -> Option<ControlFlow<Predicate>> {
        let step = match (predicate, self.operator) {
            (Predicate::Empty, _) => ControlFlow::Continue(()),
            (Predicate::AlwaysTrue, Operator::Or) => ControlFlow::Break(Predicate::AlwaysTrue),
            (Predicate::AlwaysTrue, Operator::And) => {
                self.saw_true = true;
                ControlFlow::Continue(())
            }
            (Predicate::AlwaysFalse, Operator::And) => ControlFlow::Break(Predicate::AlwaysFalse),
            (Predicate::AlwaysFalse, Operator::Or) => {
                self.saw_false = true;
                ControlFlow::Continue(())
            }
            _ => return None,
        };
        Some(step)
    }

    /// Classify one optimized operand.
    fn absorb(&mut self, predicate: Predicate) -> QueryResult<ControlFlow<Predicate>> {
        if let Some(step) = self.absorb_constant(&predicate) {
            return Ok(step);
        }

        match predicate {
            Predicate::In { field, values } => self.merge_members(field, values, false),
            Predicate::Not(inner) => match *inner {
                Predicate::In { field, values } => self.merge_members(field, values, true),
                other => self.plain.push(negate(other)),
            },
            other if self.operator == Operator::And => self.route_bound(other)?,
            other => self.plain.push(other),
        }

        Ok(ControlFlow::Continue(()))
    }

    fn merge_members(&mut self, field: FieldName, values: Vec<ScalarValue>, negated: bool) {
        let key = normalize_field(&field);
        // NOT a AND NOT b == NOT (a OR b), so negation flips the set operation.
        let narrow = (self.operator == Operator::And) != negated;
        let map = if negated {
            &mut self.non_members
        } else {
            &mut self.members
        };

        match map.get_mut(&key) {
            None => {
                map.insert(key, MemberSet { field, values });
            }
            Some(existing) if existing.accepts(&values) => {
                existing.values = if narrow {
                    intersect(&existing.values, &values)
                } else {
                    union(&existing.values, &values)
                };
            }
            Some(_) => {
                let set = Predicate::In { field, values };
                self.plain.push(if negated { negate(set) } else { set });
            }
        }
    }

    /// Park a directional date bound for range synthesis, or keep it plain.
    fn route_bound(&mut self, predicate: Predicate) -> QueryResult<()> {
        match predicate {
            Predicate::Value {
                ref field,
                comparison,
                ref value,
                ..
            }
            | Predicate::Keyword {
                ref field,
                comparison,
                ref value,
            } if value.is_date_like() && comparison.direction().is_some() => {
                let bound = Bound {
                    field: field.clone(),
                    value: value.clone(),
                    exclusive: comparison.is_exclusive(),
                    original: predicate.clone(),
                };
                let map = match comparison.direction() {
                    Some(Direction::Greater) => &mut self.greater,
                    _ => &mut self.lesser,
                };
                park(map, bound, comparison)
            }
            Predicate::Day {
                ref field,
                comparison,
                day: Some(day),
            } if Comparison::from(comparison).direction().is_some() => {
                let comparison = Comparison::from(comparison);
                let bound = Bound {
                    field: field.clone(),
                    value: day,
                    exclusive: comparison.is_exclusive(),
                    original: predicate.clone(),
                };
                let map = match comparison.direction() {
                    Some(Direction::Greater) => &mut self.day_greater,
                    _ => &mut self.day_lesser,
                };
                park(map, bound, comparison)
            }
            other => {
                self.plain.push(other);
                Ok(())
            }
        }
    }

    /// Assemble the rewritten composite.
    fn finish(mut self) -> Predicate {
        let mut derived = Vec::new();

        for set in std::mem::take(&mut self.members).into_values() {
            derived.push(set.into_predicate(false));
        }
        for set in std::mem::take(&mut self.non_members).into_values() {
            derived.push(set.into_predicate(true));
        }

        // Unpaired bounds go first: re-optimizing leaves them in front of the
        // synthesized ranges, which come back as plain operands.
        let mut ranges = Vec::new();
        pair_bounds(
            std::mem::take(&mut self.greater),
            std::mem::take(&mut self.lesser),
            &mut derived,
            &mut ranges,
            |value, days| value.shift_days(days),
            |field, min, max| Predicate::range(field, Some(min), Some(max)),
        );
        pair_bounds(
            std::mem::take(&mut self.day_greater),
            std::mem::take(&mut self.day_lesser),
            &mut derived,
            &mut ranges,
            shift_day,
            |field, from, until| Predicate::day_range(field, Some(from), Some(until)),
        );
        derived.extend(ranges.into_iter().map(Predicate::optimize_leaf));

        let mut results = Vec::with_capacity(derived.len() + self.plain.len());
        for predicate in derived {
            match self.absorb_constant(&predicate) {
                Some(ControlFlow::Break(result)) => return result,
                Some(ControlFlow::Continue(())) => {}
                None => results.push(predicate),
            }
        }
        results.append(&mut self.plain);

        match results.len() {
            0 if self.saw_true => Predicate::AlwaysTrue,
            0 if self.saw_false => Predicate::AlwaysFalse,
            0 => Predicate::Empty,
            1 => results.remove(0),
            _ => Predicate::Operation(Operation::new(self.operator, results)),
        }
    }
}

fn park<T>(map: &mut BoundMap<T>, bound: Bound<T>, comparison: Comparison) -> QueryResult<()> {
    let key = normalize_field(&bound.field);
    if map.contains_key(&key) {
        let direction = comparison.direction().unwrap_or(Direction::Greater);
        return Err(QueryError::ambiguous_merge(key, direction.as_str())
            .with_context("Merging directional bounds of an AND")
            .with_predicate(bound.original.to_string()));
    }
    map.insert(key, bound);
    Ok(())
}

/// Pair lower and upper bounds per field.
///
/// Unpaired bounds keep their original predicate and are pushed to
/// `unpaired`; paired ones become a range in `paired`. An exclusive bound
/// that cannot move inward has nothing beyond it, so its pair is
/// `AlwaysFalse`.
fn pair_bounds<T>(
    greater: BoundMap<T>,
    mut lesser: BoundMap<T>,
    unpaired: &mut Vec<Predicate>,
    paired: &mut Vec<Predicate>,
    shift: impl Fn(T, i64) -> Option<T>,
    build: impl Fn(FieldName, T, T) -> Predicate,
) {
    for (key, lower) in greater {
        match lesser.shift_remove(&key) {
            Some(upper) => {
                // Ranges are inclusive, so exclusive bounds move one day inward.
                let min = if lower.exclusive {
                    shift(lower.value, 1)
                } else {
                    Some(lower.value)
                };
                let max = if upper.exclusive {
                    shift(upper.value, -1)
                } else {
                    Some(upper.value)
                };
                paired.push(match (min, max) {
                    (Some(min), Some(max)) => build(lower.field, min, max),
                    _ => Predicate::AlwaysFalse,
                });
            }
            None => unpaired.push(lower.original),
        }
    }
    unpaired.extend(lesser.into_values().map(|bound| bound.original));
}

fn shift_day(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    let step = Days::new(days.unsigned_abs());
    if days >= 0 {
        day.checked_add_days(step)
    } else {
        day.checked_sub_days(step)
    }
}

/// Convenience for [`Optimizer::optimize`] with default settings.
pub fn optimize(predicate: Predicate) -> QueryResult<Predicate> {
    Optimizer::default().optimize(predicate)
}
