//! Abstract Syntax Tree (AST) for rule expressions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Absolute tolerance used when comparing ratings for equality.
pub const RATING_EQUALITY_TOLERANCE: f64 = 0.1;

/// Represents a parsed filter clause.
///
/// `FilterNode` is a closed set of predicates over a
/// [`ContentRecord`](crate::ContentRecord). Logical variants combine other
/// nodes, group variants mark which field a nested value expression applies
/// to, and the remaining variants are leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    // ==================== Logical ====================
    /// True when every child is true. Parsed trees always carry two or more children.
    And(Vec<FilterNode>),

    /// True when any child is true.
    Or(Vec<FilterNode>),

    /// Logical NOT of a node.
    Not(Box<FilterNode>),

    // ==================== Field Groups ====================
    /// A genre value expression.
    GenreGroup(Box<FilterNode>),

    /// A language value expression.
    LanguageGroup(Box<FilterNode>),

    /// A content type value expression.
    TypeGroup(Box<FilterNode>),

    // ==================== Equality Leaves ====================
    /// Matches records whose genre set contains the value (case-insensitive).
    GenreIs(String),

    /// Matches records whose language equals the value (case-insensitive).
    LanguageIs(String),

    /// Matches records whose content type equals the value (case-insensitive).
    TypeIs(String),

    // ==================== Numeric Leaves ====================
    /// Compares the runtime in minutes. A missing runtime counts as 0.
    RuntimeCompare {
        /// The comparison operator.
        op: ComparisonOp,
        /// Runtime to compare against, in minutes.
        minutes: i64,
    },

    /// Compares the release year. A missing year counts as 0.
    ReleaseYearCompare {
        /// The comparison operator.
        op: ComparisonOp,
        /// Year to compare against.
        year: i32,
    },

    /// Compares the community rating. A missing rating counts as 0.
    RatingCompare {
        /// The comparison operator.
        op: ComparisonOp,
        /// Rating to compare against.
        value: f64,
    },

    // ==================== Watch State ====================
    /// Matches records whose watched flag equals the value.
    WatchedIs(bool),
}

impl FilterNode {
    /// Creates an AND node from its children.
    pub fn and(children: impl IntoIterator<Item = FilterNode>) -> Self {
        FilterNode::And(children.into_iter().collect())
    }

    /// Creates an OR node from its children.
    pub fn or(children: impl IntoIterator<Item = FilterNode>) -> Self {
        FilterNode::Or(children.into_iter().collect())
    }

    /// Creates a NOT node.
    ///
    /// # Example
    ///
    /// ```
    /// use smartlist_core::expression::FilterNode;
    ///
    /// let node = FilterNode::negate(FilterNode::WatchedIs(true));
    /// assert!(matches!(node, FilterNode::Not(_)));
    /// ```
    pub fn negate(inner: FilterNode) -> Self {
        FilterNode::Not(Box::new(inner))
    }

    /// Creates a genre group holding a single genre term.
    pub fn genre(term: impl Into<String>) -> Self {
        Field::Genre.group(Field::Genre.term(term))
    }

    /// Creates a language group holding a single language term.
    pub fn language(term: impl Into<String>) -> Self {
        Field::Language.group(Field::Language.term(term))
    }

    /// Creates a type group holding a single type term.
    pub fn content_type(term: impl Into<String>) -> Self {
        Field::Type.group(Field::Type.term(term))
    }

    /// Returns true for `And` and `Or` nodes.
    fn is_compound(&self) -> bool {
        matches!(self, FilterNode::And(_) | FilterNode::Or(_))
    }
}

/// A field whose value is itself a boolean expression over bare terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The genre set.
    Genre,
    /// The spoken language.
    Language,
    /// The content type (movie, episode, ...).
    Type,
}

impl Field {
    /// The leaf kind keyword for this field.
    pub fn keyword(self) -> &'static str {
        match self {
            Field::Genre => "genre",
            Field::Language => "language",
            Field::Type => "type",
        }
    }

    /// Builds the equality leaf for a bare term of this field.
    pub fn term(self, value: impl Into<String>) -> FilterNode {
        let value = value.into();
        match self {
            Field::Genre => FilterNode::GenreIs(value),
            Field::Language => FilterNode::LanguageIs(value),
            Field::Type => FilterNode::TypeIs(value),
        }
    }

    /// Wraps a value expression in this field's group node.
    pub fn group(self, child: FilterNode) -> FilterNode {
        let child = Box::new(child);
        match self {
            Field::Genre => FilterNode::GenreGroup(child),
            Field::Language => FilterNode::LanguageGroup(child),
            Field::Type => FilterNode::TypeGroup(child),
        }
    }
}

/// Comparison operator used by numeric leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `=`
    Equal,
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
}

impl ComparisonOp {
    /// Maps an operator string to its variant.
    ///
    /// Only `<`, `>`, `=`, `<=` and `>=` are accepted; any other combination
    /// of `<`, `>` and `=` yields `None`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(ComparisonOp::LessThan),
            ">" => Some(ComparisonOp::GreaterThan),
            "=" => Some(ComparisonOp::Equal),
            "<=" => Some(ComparisonOp::LessOrEqual),
            ">=" => Some(ComparisonOp::GreaterOrEqual),
            _ => None,
        }
    }

    /// The operator as written in rule text.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::LessThan => "<",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::Equal => "=",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::GreaterOrEqual => ">=",
        }
    }

    /// Applies the operator to two integers. Equality is exact.
    pub fn compare_int(self, lhs: i64, rhs: i64) -> bool {
        match self {
            ComparisonOp::LessThan => lhs < rhs,
            ComparisonOp::GreaterThan => lhs > rhs,
            ComparisonOp::Equal => lhs == rhs,
            ComparisonOp::LessOrEqual => lhs <= rhs,
            ComparisonOp::GreaterOrEqual => lhs >= rhs,
        }
    }

    /// Applies the operator to two floats.
    ///
    /// Equality holds when the values differ by less than
    /// [`RATING_EQUALITY_TOLERANCE`]; the ordering operators are exact.
    pub fn compare_float(self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOp::LessThan => lhs < rhs,
            ComparisonOp::GreaterThan => lhs > rhs,
            ComparisonOp::Equal => (lhs - rhs).abs() < RATING_EQUALITY_TOLERANCE,
            ComparisonOp::LessOrEqual => lhs <= rhs,
            ComparisonOp::GreaterOrEqual => lhs >= rhs,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A fully parsed `{filter | sort | count}` expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExpression {
    /// The filter predicate.
    pub filter: FilterNode,
    /// The sort key as written (interpreted case-insensitively).
    pub sort_key: String,
    /// Maximum number of items to select.
    pub count: usize,
}

// ==================== Rule Text Rendering ====================
//
// Rendering produces text that parses back into the same tree. Compound
// children are always wrapped, with brackets in the clause grammar and
// parentheses inside field values, because the parser splits on AND before
// OR rather than by precedence.

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clause(f, self)
    }
}

impl fmt::Display for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} | {} | {}}}", self.filter, self.sort_key, self.count)
    }
}

fn write_clause(f: &mut fmt::Formatter<'_>, node: &FilterNode) -> fmt::Result {
    match node {
        FilterNode::And(children) => write_joined(f, children, " AND ", write_clause, ('[', ']')),
        FilterNode::Or(children) => write_joined(f, children, " OR ", write_clause, ('[', ']')),
        FilterNode::Not(inner) => {
            f.write_str("NOT ")?;
            write_wrapped(f, inner, write_clause, ('[', ']'))
        }
        FilterNode::GenreGroup(inner) => write_field(f, Field::Genre, inner),
        FilterNode::LanguageGroup(inner) => write_field(f, Field::Language, inner),
        FilterNode::TypeGroup(inner) => write_field(f, Field::Type, inner),
        FilterNode::GenreIs(_) | FilterNode::LanguageIs(_) | FilterNode::TypeIs(_) => {
            write_value(f, node)
        }
        FilterNode::RuntimeCompare { op, minutes } => write!(f, "length:{op}{minutes}"),
        FilterNode::ReleaseYearCompare { op, year } => write!(f, "released:{op}{year:04}"),
        FilterNode::RatingCompare { op, value } => write!(f, "rating:{op}{value}"),
        FilterNode::WatchedIs(value) => write!(f, "watchstatus:{value}"),
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: Field, inner: &FilterNode) -> fmt::Result {
    write!(f, "{}:", field.keyword())?;
    write_wrapped(f, inner, write_value, ('(', ')'))
}

fn write_value(f: &mut fmt::Formatter<'_>, node: &FilterNode) -> fmt::Result {
    match node {
        FilterNode::And(children) => write_joined(f, children, " AND ", write_value, ('(', ')')),
        FilterNode::Or(children) => write_joined(f, children, " OR ", write_value, ('(', ')')),
        FilterNode::Not(inner) => {
            f.write_str("NOT ")?;
            write_wrapped(f, inner, write_value, ('(', ')'))
        }
        FilterNode::GenreIs(term) | FilterNode::LanguageIs(term) | FilterNode::TypeIs(term) => {
            f.write_str(term)
        }
        other => write_clause(f, other),
    }
}

type NodeWriter = fn(&mut fmt::Formatter<'_>, &FilterNode) -> fmt::Result;

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    children: &[FilterNode],
    separator: &str,
    write: NodeWriter,
    delimiters: (char, char),
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_wrapped(f, child, write, delimiters)?;
    }
    Ok(())
}

fn write_wrapped(
    f: &mut fmt::Formatter<'_>,
    node: &FilterNode,
    write: NodeWriter,
    (open, close): (char, char),
) -> fmt::Result {
    if node.is_compound() {
        write!(f, "{open}")?;
        write(f, node)?;
        write!(f, "{close}")
    } else {
        write(f, node)
    }
}
