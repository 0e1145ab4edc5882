//! Error types for predicate construction and optimization.
//!
//! Errors carry a code for programmatic handling, a message, and optional
//! context with suggestions for how the caller can fix the predicate.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Predicate errors (invalid construction, ambiguous merge)
//! - 5xxx: Translation errors raised by backend translators
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use sieve_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::ambiguous_merge("published_at", "greater");
//! assert_eq!(err.code, ErrorCode::AmbiguousMerge);
//! assert!(err.to_string().contains("published_at"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for predicate operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Predicate errors (1xxx)
    /// Composite predicate built without an operator (S1001).
    InvalidConstruction = 1001,
    /// Two directional predicates on the same field in one AND (S1002).
    AmbiguousMerge = 1002,

    // Translation errors (5xxx)
    /// A translator could not express the predicate (S5001).
    UnsupportedPredicate = 5001,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
    /// Configuration file could not be read (S7002).
    ConfigurationIo = 7002,

    // Internal errors (9xxx)
    /// Internal error (S9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidConstruction => "Invalid predicate construction",
            Self::AmbiguousMerge => "Ambiguous directional predicates",
            Self::UnsupportedPredicate => "Unsupported predicate",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::ConfigurationIo => "Configuration file unreadable",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The field involved.
    pub field: Option<String>,
    /// Rendered form of the offending predicate (if available).
    pub predicate: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building or optimizing predicates.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Attach the rendered predicate.
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.context.predicate = Some(predicate.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A composite predicate was built without an AND/OR operator.
    pub fn missing_operator() -> Self {
        Self::new(
            ErrorCode::InvalidConstruction,
            "Composite predicate has no operator",
        )
        .with_suggestion("Build composites with Predicate::and(..) or Predicate::or(..)")
        .with_help("Deserialized operations must carry an \"operator\" of \"and\" or \"or\"")
    }

    /// Two directional predicates target the same field inside one AND.
    pub fn ambiguous_merge(field: impl Into<String>, direction: &str) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::AmbiguousMerge,
            format!(
                "Field '{}' has more than one {} bound in the same AND",
                field, direction
            ),
        )
        .with_field(&field)
        .with_code_suggestion(
            "Express the bounds as a single explicit range",
            format!("Predicate::range(\"{}\", Some(lower), Some(upper))", field),
        )
    }

    /// A translator does not support the given predicate.
    pub fn unsupported(predicate: impl Into<String>) -> Self {
        let predicate = predicate.into();
        Self::new(
            ErrorCode::UnsupportedPredicate,
            format!("Predicate cannot be translated: {}", predicate),
        )
        .with_predicate(predicate)
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
            .with_help("This is likely a bug in sieve")
    }

    // ============== Error Checks ==============

    /// Check if the error was caused by how the caller built the predicate.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidConstruction | ErrorCode::AmbiguousMerge
        )
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidConfiguration | ErrorCode::ConfigurationIo
        )
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref predicate) = self.context.predicate {
            let shown = if predicate.chars().count() > 200 {
                format!("{}...", predicate.chars().take(200).collect::<String>())
            } else {
                predicate.clone()
            };
            output.push_str(&format!("  → Predicate: {}\n", shown));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     ```\n     {}\n     ```\n", code.replace('\n', "\n     ")));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }

    /// Display error with ANSI colors for terminal output.
    pub fn display_colored(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\x1b[1;31mError [{}]\x1b[0m: \x1b[1m{}\x1b[0m\n",
            self.code.code(),
            self.message
        ));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  \x1b[2m→ While:\x1b[0m {}\n", op));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  \x1b[2m→ Field:\x1b[0m {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\n\x1b[1;33mSuggestions:\x1b[0m\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  \x1b[33m{}.\x1b[0m {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!(
                        "     \x1b[2m```\x1b[0m\n     \x1b[36m{}\x1b[0m\n     \x1b[2m```\x1b[0m\n",
                        code.replace('\n', "\n     ")
                    ));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\n\x1b[1;36mHelp:\x1b[0m {}\n", help));
        }

        output
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
