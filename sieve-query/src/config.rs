//! Configuration file parsing for `sieve.toml`.
//!
//! ```rust
//! use sieve_query::config::SieveConfig;
//!
//! let config = SieveConfig::from_str(r#"
//!     [calendar]
//!     utc_offset = "+02:00"
//!
//!     [suggest]
//!     default_count = 5
//! "#).unwrap();
//!
//! assert_eq!(config.suggest.default_count, 5);
//! assert_eq!(config.calendar().unwrap().offset().local_minus_utc(), 7200);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calendar::WorkingCalendar;
use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::predicate::Predicate;

/// Main configuration structure for `sieve.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SieveConfig {
    /// Working calendar settings.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Full-text settings.
    #[serde(default)]
    pub fulltext: FulltextConfig,

    /// Typeahead settings.
    #[serde(default)]
    pub suggest: SuggestConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl SieveConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::new(
                ErrorCode::ConfigurationIo,
                format!("Failed to read configuration file {}", path.display()),
            )
            .with_source(e)
        })?;

        let config = Self::from_str(&content)?;
        info!(path = %path.display(), "SieveConfig loaded from file");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded from the
    /// environment before parsing.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content)?;

        let config: Self = toml::from_str(&expanded).map_err(|e| {
            QueryError::invalid_configuration(format!("Failed to parse configuration: {}", e))
                .with_source(e)
        })?;
        config.calendar()?;
        Ok(config)
    }

    /// The working calendar used to truncate instants to days.
    pub fn calendar(&self) -> QueryResult<WorkingCalendar> {
        WorkingCalendar::parse(&self.calendar.utc_offset)
    }

    /// Name of the field full-text predicates are matched against.
    pub fn fulltext_field(&self) -> &str {
        &self.fulltext.field
    }

    /// Typeahead request using the configured default count.
    pub fn suggest(&self, text: impl Into<String>) -> Predicate {
        Predicate::suggest(text, self.suggest.default_count)
    }
}

/// Working calendar configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// UTC offset of the working calendar, e.g. `+02:00`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

/// Full-text configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FulltextConfig {
    /// Designated full-text field.
    #[serde(default = "default_fulltext_field")]
    pub field: String,
}

impl Default for FulltextConfig {
    fn default() -> Self {
        Self {
            field: default_fulltext_field(),
        }
    }
}

fn default_fulltext_field() -> String {
    "_all".to_string()
}

/// Typeahead configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestConfig {
    /// Number of suggestions requested when the caller gives none.
    #[serde(default = "default_suggest_count")]
    pub default_count: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            default_count: default_suggest_count(),
        }
    }
}

fn default_suggest_count() -> usize {
    10
}

/// Debug configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Trace every classification made while optimizing composites.
    #[serde(default)]
    pub log_rewrites: bool,
}

fn expand_env_vars(content: &str) -> QueryResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .map_err(|e| QueryError::internal(e.to_string()))?;

    let expanded = re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        match std::env::var(&caps[1]) {
            Ok(value) => value,
            Err(_) => match caps.get(2) {
                Some(default) => default.as_str().to_string(),
                None => caps[0].to_string(),
            },
        }
    });

    Ok(expanded.into_owned())
}
