//! Fuzz target for the predicate optimizer.
//!
//! Generates arbitrary predicate trees over a small field alphabet, so that
//! merges actually happen, and checks that:
//! - optimizing never panics
//! - a successful result is a fixpoint
//! - no composite in the result is empty, single-operand, or directly nested
//!   in a composite with the same operator
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_optimize_predicate
//! ```

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use chrono::{Days, NaiveDate};
use libfuzzer_sys::fuzz_target;
use sieve_query::{Comparison, DayComparison, Operation, Operator, Predicate, ScalarValue};

const FIELDS: [&str; 4] = ["a", "A", "b", " a "];

fn field(selector: u8) -> &'static str {
    FIELDS[selector as usize % FIELDS.len()]
}

fn day(offset: u16) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.checked_add_days(Days::new(u64::from(offset % 1000))))
        .unwrap_or(NaiveDate::MIN)
}

/// A fuzzable scalar value.
#[derive(Debug, Arbitrary, Clone)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i8),
    Float(f64),
    String(String),
    Date(u16),
}

impl From<FuzzValue> for ScalarValue {
    fn from(val: FuzzValue) -> Self {
        match val {
            FuzzValue::Null => ScalarValue::Null,
            FuzzValue::Bool(b) => ScalarValue::Bool(b),
            FuzzValue::Int(i) => ScalarValue::Int(i64::from(i)),
            FuzzValue::Float(f) => ScalarValue::Float(f),
            FuzzValue::String(s) => ScalarValue::String(s),
            FuzzValue::Date(d) => ScalarValue::Date(day(d)),
        }
    }
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzComparison {
    Eq,
    NotEq,
    Like,
    Gt,
    Ge,
    Lt,
    Le,
}

impl From<FuzzComparison> for Comparison {
    fn from(c: FuzzComparison) -> Self {
        match c {
            FuzzComparison::Eq => Comparison::Eq,
            FuzzComparison::NotEq => Comparison::NotEq,
            FuzzComparison::Like => Comparison::Like,
            FuzzComparison::Gt => Comparison::Gt,
            FuzzComparison::Ge => Comparison::Ge,
            FuzzComparison::Lt => Comparison::Lt,
            FuzzComparison::Le => Comparison::Le,
        }
    }
}

impl From<FuzzComparison> for DayComparison {
    fn from(c: FuzzComparison) -> Self {
        match c {
            FuzzComparison::Eq | FuzzComparison::Like => DayComparison::Eq,
            FuzzComparison::NotEq => DayComparison::NotEq,
            FuzzComparison::Gt => DayComparison::Gt,
            FuzzComparison::Ge => DayComparison::Ge,
            FuzzComparison::Lt => DayComparison::Lt,
            FuzzComparison::Le => DayComparison::Le,
        }
    }
}

/// A fuzzable predicate.
#[derive(Debug, Arbitrary)]
enum FuzzPredicate {
    Value(u8, FuzzComparison, FuzzValue),
    Keyword(u8, FuzzComparison, FuzzValue),
    Range(u8, Option<FuzzValue>, Option<FuzzValue>),
    Day(u8, FuzzComparison, Option<u16>),
    DayRange(u8, Option<u16>, Option<u16>),
    In(u8, Vec<FuzzValue>),
    IsNull(u8, bool),
    Fulltext(String),
    Suggest(String, u8),
    Not(Box<FuzzPredicate>),
    And(Vec<FuzzPredicate>),
    Or(Vec<FuzzPredicate>),
    Headless(Vec<FuzzPredicate>),
    FindAll,
    AlwaysTrue,
    AlwaysFalse,
    Empty,
}

impl FuzzPredicate {
    fn to_predicate(self, depth: usize) -> Predicate {
        // Limit recursion depth to prevent stack overflow
        if depth > 12 {
            return Predicate::Empty;
        }

        let children = |operands: Vec<FuzzPredicate>| -> Vec<Predicate> {
            operands
                .into_iter()
                .take(8)
                .map(|p| p.to_predicate(depth + 1))
                .collect()
        };

        match self {
            FuzzPredicate::Value(f, c, v) => Predicate::value(field(f), c.into(), v),
            FuzzPredicate::Keyword(f, c, v) => Predicate::keyword(field(f), c.into(), v),
            FuzzPredicate::Range(f, min, max) => {
                Predicate::range(field(f), min.map(Into::into), max.map(Into::into))
            }
            FuzzPredicate::Day(f, c, d) => Predicate::day(field(f), c.into(), d.map(day)),
            FuzzPredicate::DayRange(f, from, until) => {
                Predicate::day_range(field(f), from.map(day), until.map(day))
            }
            FuzzPredicate::In(f, values) => Predicate::in_list(field(f), values.into_iter().take(8)),
            FuzzPredicate::IsNull(f, m) => Predicate::is_null(field(f), m),
            FuzzPredicate::Fulltext(t) => Predicate::fulltext(t),
            FuzzPredicate::Suggest(t, n) => Predicate::suggest(t, usize::from(n)),
            FuzzPredicate::Not(inner) => Predicate::negate(inner.to_predicate(depth + 1)),
            FuzzPredicate::And(ops) => Predicate::and(children(ops)),
            FuzzPredicate::Or(ops) => Predicate::or(children(ops)),
            FuzzPredicate::Headless(ops) => Predicate::Operation(Operation {
                operator: None,
                operands: children(ops),
            }),
            FuzzPredicate::FindAll => Predicate::FindAll,
            FuzzPredicate::AlwaysTrue => Predicate::AlwaysTrue,
            FuzzPredicate::AlwaysFalse => Predicate::AlwaysFalse,
            FuzzPredicate::Empty => Predicate::Empty,
        }
    }
}

fn assert_canonical(p: &Predicate) {
    match p {
        Predicate::Operation(op) => {
            assert!(op.operands.len() >= 2, "degenerate composite: {}", p);
            let operator: Option<Operator> = op.operator;
            assert!(operator.is_some(), "composite without operator: {}", p);
            for child in &op.operands {
                if let Predicate::Operation(inner) = child {
                    assert_ne!(inner.operator, operator, "unflattened composite: {}", p);
                }
                assert!(!child.is_sentinel(), "sentinel operand: {}", p);
                assert_canonical(child);
            }
        }
        Predicate::Not(inner) => assert_canonical(inner),
        _ => {}
    }
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);

    if let Ok(fuzz_predicate) = FuzzPredicate::arbitrary(&mut unstructured) {
        let tree = fuzz_predicate.to_predicate(0);

        if let Ok(once) = tree.optimize() {
            assert_canonical(&once);
            let twice = once.clone().optimize().expect("optimized tree failed to re-optimize");
            assert_eq!(twice, once, "optimize is not idempotent for {}", tree);
        }
    }
});
