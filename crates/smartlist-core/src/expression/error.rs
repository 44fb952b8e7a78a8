//! Error types for the rule expression parser.

use thiserror::Error;

/// A specialized Result type for expression parsing operations.
pub type ExpressionResult<T> = Result<T, FormatError>;

/// Errors raised while parsing a rule expression.
///
/// Every variant is a format problem in the expression text. Evaluation of a
/// successfully parsed expression never fails, so this is the only error the
/// expression engine surfaces.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The expression is not wrapped in `{` and `}`.
    #[error("expression must be wrapped in braces: {expression}")]
    MissingBraces {
        /// The offending expression text.
        expression: String,
    },

    /// The braces do not contain exactly `filter | sort | count`.
    #[error("expected 3 pipe-separated parts (filter | sort | count), found {found}")]
    PartCount {
        /// How many parts were found.
        found: usize,
    },

    /// The count part is not a non-negative integer literal.
    #[error("invalid count: '{value}' (expected a non-negative integer)")]
    InvalidCount {
        /// The rejected count text.
        value: String,
    },

    /// The filter clause (or a part of it) is empty.
    #[error("filter clause is empty")]
    EmptyFilter,

    /// A leaf clause has no `kind:value` separator.
    #[error("filter clause '{clause}' is missing a ':' separator")]
    MissingColon {
        /// The clause without a colon.
        clause: String,
    },

    /// The leaf kind before the colon is not recognized.
    #[error("unknown filter kind: '{kind}'{}", suggestion_suffix(.suggestion))]
    UnknownKind {
        /// The unrecognized kind.
        kind: String,
        /// The closest known kind, when one is near enough.
        suggestion: Option<String>,
    },

    /// A numeric leaf value is not `<op><number>` or uses an unsupported operator.
    #[error("invalid {kind} comparison: '{value}'")]
    InvalidComparison {
        /// The leaf kind (`length`, `released`, `rating`).
        kind: String,
        /// The rejected value.
        value: String,
    },

    /// A `watchstatus` value is neither `true` nor `false`.
    #[error("invalid watchstatus value: '{value}' (expected true or false)")]
    InvalidBoolean {
        /// The rejected value.
        value: String,
    },

    /// A genre/language/type expression contains an empty term.
    #[error("empty {field} term")]
    EmptyTerm {
        /// The field the term belongs to.
        field: String,
    },

    /// Groups are nested deeper than the parser allows.
    #[error("expression nesting exceeds maximum depth of {max}")]
    TooDeep {
        /// The maximum supported depth.
        max: usize,
    },
}

/// Formats the "did you mean" tail of an unknown kind message.
fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

impl FormatError {
    /// Creates a missing braces error.
    pub fn missing_braces(expression: impl Into<String>) -> Self {
        FormatError::MissingBraces {
            expression: expression.into(),
        }
    }

    /// Creates an invalid count error.
    pub fn invalid_count(value: impl Into<String>) -> Self {
        FormatError::InvalidCount {
            value: value.into(),
        }
    }

    /// Creates a missing colon error.
    pub fn missing_colon(clause: impl Into<String>) -> Self {
        FormatError::MissingColon {
            clause: clause.into(),
        }
    }

    /// Creates an unknown kind error with an optional suggestion.
    pub fn unknown_kind(kind: impl Into<String>, suggestion: Option<&str>) -> Self {
        FormatError::UnknownKind {
            kind: kind.into(),
            suggestion: suggestion.map(str::to_string),
        }
    }

    /// Creates an invalid comparison error.
    pub fn invalid_comparison(kind: impl Into<String>, value: impl Into<String>) -> Self {
        FormatError::InvalidComparison {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Creates an invalid boolean error.
    pub fn invalid_boolean(value: impl Into<String>) -> Self {
        FormatError::InvalidBoolean {
            value: value.into(),
        }
    }

    /// Creates an empty term error.
    pub fn empty_term(field: impl Into<String>) -> Self {
        FormatError::EmptyTerm {
            field: field.into(),
        }
    }
}
