//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that `sieve.toml` files load correctly and that the
//! loaded settings reach the optimizer and predicate constructors.

use std::io::Write;

use chrono::{NaiveDate, TimeZone, Utc};
use sieve::query::config::SieveConfig;
use sieve::query::{DayComparison, ErrorCode, Optimizer, Predicate};

/// Test minimal configuration
#[test]
fn test_config_minimal() {
    let config = SieveConfig::from_str("").expect("Failed to parse config");
    assert_eq!(config, SieveConfig::default());
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config_str = r#"
        [calendar]
        utc_offset = "+09:30"

        [fulltext]
        field = "content"

        [suggest]
        default_count = 7

        [debug]
        log_rewrites = true
    "#;

    let config = SieveConfig::from_str(config_str).expect("Failed to parse config");

    assert_eq!(config.calendar().unwrap().offset().local_minus_utc(), 9 * 3600 + 1800);
    assert_eq!(config.fulltext_field(), "content");
    assert_eq!(config.suggest("par"), Predicate::suggest("par", 7));
    assert!(config.debug.log_rewrites);
}

/// Test loading from a file on disk
#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[suggest]\ndefault_count = 3").unwrap();

    let config = SieveConfig::from_file(file.path()).unwrap();
    assert_eq!(config.suggest.default_count, 3);
    assert_eq!(config.fulltext_field(), "_all");
}

/// Test that a missing file reports an I/O configuration error
#[test]
fn test_config_missing_file() {
    let err = SieveConfig::from_file("/definitely/not/here/sieve.toml").unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigurationIo);
    assert!(err.display_full().contains("S7002"));
}

/// Test environment variable defaults
#[test]
fn test_config_env_default() {
    let config = SieveConfig::from_str(
        r#"
        [calendar]
        utc_offset = "${SIEVE_IT_UNSET_OFFSET:--03:00}"
        "#,
    )
    .unwrap();

    assert_eq!(config.calendar().unwrap().offset().local_minus_utc(), -3 * 3600);
}

/// Test that malformed TOML is rejected
#[test]
fn test_config_malformed() {
    let err = SieveConfig::from_str("[calendar\nutc_offset = 1").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    assert!(err.is_configuration_error());
}

/// Test that an unset variable without default is left for validation
#[test]
fn test_config_unresolved_offset_rejected() {
    let err = SieveConfig::from_str(
        r#"
        [calendar]
        utc_offset = "${SIEVE_IT_NEVER_SET}"
        "#,
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test that the configured calendar drives day truncation
#[test]
fn test_config_calendar_truncation() {
    let config = SieveConfig::from_str("[calendar]\nutc_offset = \"+10:00\"").unwrap();
    let calendar = config.calendar().unwrap();
    let instant = Utc.with_ymd_and_hms(2022, 12, 31, 15, 30, 0).unwrap();

    assert_eq!(
        Predicate::day_at("d", DayComparison::Eq, Some(instant), &calendar),
        Predicate::day("d", DayComparison::Eq, NaiveDate::from_ymd_opt(2023, 1, 1))
    );
}

/// Test that an optimizer built from configuration behaves like the default one
#[test]
fn test_config_optimizer() {
    let config = SieveConfig::from_str("[debug]\nlog_rewrites = true").unwrap();
    let tree = Predicate::and([
        Predicate::in_list("f", [1, 2]),
        Predicate::in_list("f", [2, 3]),
        Predicate::fulltext(""),
    ]);

    assert_eq!(
        Optimizer::new(&config).optimize(tree.clone()).unwrap(),
        Optimizer::default().optimize(tree).unwrap()
    );
}
