//! Integration tests for the predicate optimizer.
//!
//! These tests exercise the public surface end to end:
//! - Sentinel handling and short-circuiting
//! - Set merging for membership predicates
//! - Range synthesis from directional bounds
//! - Error reporting
//! - Idempotence over a corpus of mixed trees

use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sieve::query::builder::{self, AndBuilder};
use sieve::query::visit::{DepthProbe, walk};
use sieve::query::{
    Comparison, DayComparison, ErrorCode, FilterOutcome, Operation, Predicate, ScalarValue,
    WorkingCalendar,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn optimize(p: Predicate) -> Predicate {
    p.optimize().expect("optimize failed")
}

/// Trees covering every node kind and most rewrite paths.
fn corpus() -> Vec<Predicate> {
    vec![
        Predicate::and(Vec::new()),
        Predicate::or([Predicate::AlwaysFalse, Predicate::Empty]),
        builder::and([builder::eq("a", 1), Predicate::AlwaysTrue]),
        builder::and([
            builder::in_list("f", [1, 2, 3]),
            builder::or([builder::eq("x", 1), builder::or([builder::eq("y", 2)])]),
            builder::and([builder::in_list("F", [3, 4])]),
            builder::not_in("g", ["a"]),
            builder::not_in("g", ["b"]),
        ]),
        builder::or([
            builder::in_list("f", [1]),
            builder::in_list("f", ["one"]),
            builder::not(builder::is_null("z")),
            builder::fulltext("rust"),
            builder::suggest("ru", 5),
        ]),
        builder::and([
            builder::ge("d", date(2020, 1, 1)),
            builder::lt("d", date(2021, 1, 1)),
            builder::day("p", DayComparison::Gt, date(2020, 6, 1)),
            builder::day("p", DayComparison::Le, date(2020, 6, 30)),
            builder::day("q", DayComparison::Ge, date(2020, 6, 1)),
            builder::keyword("sku", "A-1"),
            builder::find_all(),
        ]),
        builder::not(builder::and([
            builder::not(builder::in_list("k", Vec::<i64>::new())),
            builder::day_range("r", Some(date(2020, 1, 1)), None),
            builder::range("n", Some(1), Some(10)),
        ])),
        builder::or([
            builder::and([builder::ge("d", date(2020, 1, 1)), builder::le("d", date(2020, 3, 1))]),
            builder::and([builder::ge("d", date(2021, 1, 1)), builder::le("d", date(2021, 3, 1))]),
        ]),
    ]
}

/// True if no operation in the tree is empty, single-operand, or nested
/// directly inside an operation with the same operator.
fn is_canonical(p: &Predicate) -> bool {
    match p {
        Predicate::Operation(op) => {
            op.operands.len() >= 2
                && op.operands.iter().all(|child| match child {
                    Predicate::Operation(inner) => inner.operator != op.operator,
                    _ => true,
                })
                && op.operands.iter().all(is_canonical)
        }
        Predicate::Not(inner) => !inner.is_sentinel() && is_canonical(inner),
        _ => true,
    }
}

#[test]
fn test_idempotence_over_corpus() {
    for tree in corpus() {
        let once = optimize(tree.clone());
        let twice = optimize(once.clone());
        assert_eq!(twice, once, "not idempotent for {}", tree);
    }
}

#[test]
fn test_output_is_canonical() {
    for tree in corpus() {
        let optimized = optimize(tree.clone());
        assert!(is_canonical(&optimized), "{} -> {}", tree, optimized);
    }
}

#[test]
fn test_and_absorbs_true() {
    let x = builder::or([builder::eq("a", 1), builder::eq("b", 2)]);
    assert_eq!(
        optimize(builder::and([Predicate::AlwaysTrue, x.clone()])),
        optimize(x)
    );
}

#[test]
fn test_or_short_circuits_on_true() {
    let x = builder::and([builder::eq("a", 1), builder::eq("b", 2)]);
    assert_eq!(
        optimize(builder::or([Predicate::AlwaysTrue, x])),
        Predicate::AlwaysTrue
    );
}

#[test]
fn test_empty_is_neutral() {
    assert_eq!(optimize(Predicate::and(Vec::new())), Predicate::Empty);
    assert_eq!(optimize(Predicate::or(Vec::new())), Predicate::Empty);
    assert_eq!(
        optimize(builder::and([builder::eq("a", ScalarValue::Null), builder::fulltext(" ")])),
        Predicate::Empty
    );
}

#[test]
fn test_in_set_algebra() {
    assert_eq!(
        optimize(builder::and([
            builder::in_list("f", [1, 2, 3]),
            builder::in_list("f", [2, 3, 4]),
        ])),
        builder::in_list("f", [2, 3])
    );
    assert_eq!(
        optimize(builder::or([
            builder::in_list("f", [1, 2]),
            builder::in_list("f", [2, 3]),
        ])),
        builder::in_list("f", [1, 2, 3])
    );
    assert_eq!(
        optimize(builder::in_list("f", Vec::<i64>::new())),
        Predicate::AlwaysFalse
    );
}

#[test]
fn test_range_synthesis() {
    assert_eq!(
        optimize(builder::and([
            builder::ge("d", date(2020, 1, 1)),
            builder::le("d", date(2020, 12, 31)),
        ])),
        builder::range("d", Some(date(2020, 1, 1)), Some(date(2020, 12, 31)))
    );
}

#[test]
fn test_range_synthesis_with_timestamps() {
    let lower = Utc.with_ymd_and_hms(2020, 1, 1, 8, 0, 0).unwrap();
    let upper = Utc.with_ymd_and_hms(2020, 1, 10, 8, 0, 0).unwrap();

    assert_eq!(
        optimize(builder::and([builder::gt("at", lower), builder::lt("at", upper)])),
        builder::range(
            "at",
            Some(Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2020, 1, 9, 8, 0, 0).unwrap()),
        )
    );
}

#[test]
fn test_day_range_with_exclusive_shift() {
    assert_eq!(
        optimize(builder::and([
            builder::day("d", DayComparison::Gt, date(2020, 1, 1)),
            builder::day("d", DayComparison::Le, date(2020, 1, 31)),
        ])),
        builder::day_range("d", Some(date(2020, 1, 2)), Some(date(2020, 1, 31)))
    );
}

#[test]
fn test_day_predicates_from_instants() {
    let calendar = WorkingCalendar::parse("-05:00").unwrap();
    let from = Utc.with_ymd_and_hms(2020, 3, 1, 3, 0, 0).unwrap();
    let until = Utc.with_ymd_and_hms(2020, 3, 31, 12, 0, 0).unwrap();

    let tree = builder::and([
        Predicate::day_at("d", DayComparison::Ge, Some(from), &calendar),
        Predicate::day_at("d", DayComparison::Le, Some(until), &calendar),
    ]);
    assert_eq!(
        optimize(tree),
        builder::day_range("d", Some(date(2020, 2, 29)), Some(date(2020, 3, 31)))
    );
}

#[test]
fn test_duplicate_bound_conflict() {
    let err = builder::and([
        builder::ge("Created", date(2020, 1, 1)),
        builder::eq("other", 1),
        builder::ge("created", date(2020, 6, 1)),
    ])
    .optimize()
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::AmbiguousMerge);
    assert!(err.is_caller_error());
    assert!(err.to_string().contains("created"));
    assert!(!err.context.suggestions.is_empty());
}

#[test]
fn test_conflict_found_in_nested_and() {
    let tree = builder::or([
        builder::eq("a", 1),
        builder::and([
            builder::le("d", date(2020, 1, 1)),
            builder::and([builder::lt("d", date(2020, 2, 1))]),
        ]),
    ]);
    assert_eq!(tree.optimize().unwrap_err().code, ErrorCode::AmbiguousMerge);
}

#[test]
fn test_single_survivor() {
    assert_eq!(
        optimize(builder::and([builder::eq("a", 1)])),
        builder::eq("a", 1)
    );
}

#[test]
fn test_missing_operator_from_json() {
    let tree: Predicate =
        serde_json::from_str(r#"{"operation": {"operands": [{"fulltext": {"text": "x"}}]}}"#)
            .unwrap();
    let err = tree.optimize().unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConstruction);
    assert_eq!(err.code.code(), "S1001");
}

#[test]
fn test_json_round_trip_of_optimized_tree() {
    let optimized = optimize(builder::and([
        builder::in_list("status", ["a", "b"]),
        builder::in_list("status", ["b", "c"]),
        builder::like("title", "rust"),
    ]));

    let json = serde_json::to_value(&optimized).unwrap();
    let back: Predicate = serde_json::from_value(json).unwrap();
    assert_eq!(back, optimized);
}

#[test]
fn test_mixed_kinds_survive_unmerged() {
    let optimized = optimize(builder::or([
        builder::in_list("f", [1]),
        builder::in_list("f", ["1"]),
    ]));
    assert_eq!(optimized.node_count(), 3);
    assert_eq!(optimized.fields(), vec!["f"]);
}

#[test]
fn test_outcomes() {
    assert_eq!(
        optimize(builder::and([builder::in_list("f", [1]), builder::in_list("f", [2])]))
            .into_outcome(),
        FilterOutcome::NoResults
    );
    assert_eq!(
        optimize(builder::or([builder::find_all()])).into_outcome(),
        FilterOutcome::NoFilter
    );
}

#[test]
fn test_operation_builder_then_optimize() {
    let status: Option<Predicate> = Some(builder::in_list("status", ["live"]));
    let tree = AndBuilder::with_capacity(4)
        .push(builder::ge("d", date(2020, 1, 1)))
        .push_if_some(status)
        .push_if_some(None)
        .push(builder::le("d", date(2020, 1, 31)))
        .build();

    assert_eq!(
        optimize(tree),
        builder::and([
            builder::in_list("status", ["live"]),
            builder::range("d", Some(date(2020, 1, 1)), Some(date(2020, 1, 31))),
        ])
    );
}

#[test]
fn test_deep_tree_stays_within_probe() {
    let mut tree = builder::eq("leaf", 1);
    for i in 0..64 {
        tree = if i % 2 == 0 {
            builder::and([tree, builder::eq("a", i)])
        } else {
            builder::or([tree, builder::eq("b", i)])
        };
    }
    assert_eq!(tree.depth(), 65);

    let optimized = optimize(tree);
    let mut probe = DepthProbe::new(128);
    assert!(walk(&optimized, &mut probe).is_continue());
    assert_eq!(optimize(optimized.clone()), optimized);
}

#[test]
fn test_operation_type_is_public() {
    let op = Operation::new(sieve::query::Operator::Or, [builder::eq("a", Comparison::Eq.as_str())]);
    assert_eq!(optimize(Predicate::Operation(op)), builder::eq("a", "="));
}
