//! Recursive descent parser for rule expressions.

use strsim::levenshtein;

use super::ast::{ComparisonOp, Field, FilterNode, ParsedExpression};
use super::error::{ExpressionResult, FormatError};
use super::scanner::{split_top_level, strip_group, strip_not, Grammar};

/// Maximum nesting of groups, negations and logical splits.
const MAX_NESTING_DEPTH: usize = 64;

/// Maximum Levenshtein distance to suggest a known kind for an unknown one.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Leaf kinds recognized before the `:` of a clause.
const LEAF_KINDS: &[&str] = &[
    "genre",
    "language",
    "type",
    "length",
    "released",
    "rating",
    "watchstatus",
];

/// Characters that make up a comparison operator.
const COMPARISON_CHARS: &[char] = &['<', '>', '='];

/// Parser for `{filter | sort | count}` rule expressions.
///
/// Parsing works on substrings rather than tokens. At each level of the
/// filter clause the parser tries, in order:
///
/// 1. split on a whole-word `AND` outside any group
/// 2. split on a whole-word `OR` outside any group
/// 3. strip a leading `NOT`
/// 4. unwrap one layer of `[...]` spanning the whole text
/// 5. parse a `kind:value` leaf
///
/// Because AND is tried before OR, `A AND B OR C` becomes `And(A, Or(B, C))`.
/// This is a fixed split order, not operator precedence; mixed expressions
/// should be bracketed.
///
/// Values of `genre:`, `language:` and `type:` are parsed by the same steps
/// with `(...)` as the grouping delimiters, producing bare-term leaves.
///
/// # Grammar
///
/// ```text
/// expression ::= "{" clause "|" sort_key "|" count "}"
/// clause     ::= clause "AND" clause | clause "OR" clause
///              | "NOT" clause | "[" clause "]" | leaf
/// leaf       ::= "genre:" value | "language:" value | "type:" value
///              | "length:" op integer | "released:" op year
///              | "rating:" op decimal | "watchstatus:" ("true" | "false")
/// value      ::= value "AND" value | value "OR" value
///              | "NOT" value | "(" value ")" | term
/// op         ::= "<" | ">" | "=" | "<=" | ">="
/// ```
///
/// # Example
///
/// ```
/// use smartlist_core::expression::{ExpressionParser, FilterNode};
///
/// let expression = ExpressionParser::parse("{[genre:Action AND NOT released:<2000] | rating | 20}").unwrap();
/// assert!(matches!(expression.filter, FilterNode::And(_)));
/// assert_eq!(expression.sort_key, "rating");
/// assert_eq!(expression.count, 20);
/// ```
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parses a complete `{filter | sort | count}` expression.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::MissingBraces` if the text is not wrapped in braces.
    ///
    /// Returns `FormatError::PartCount` if the braces do not hold exactly three
    /// pipe-separated parts.
    ///
    /// Returns `FormatError::InvalidCount` if the count is not a non-negative integer.
    ///
    /// Any error from [`parse_filter`](Self::parse_filter) is returned as-is.
    pub fn parse(input: &str) -> ExpressionResult<ParsedExpression> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| FormatError::missing_braces(trimmed))?;

        let parts: Vec<&str> = body.split('|').map(str::trim).collect();
        let [filter, sort_key, count] = parts[..] else {
            return Err(FormatError::PartCount { found: parts.len() });
        };

        let count = parse_count(count)?;
        let filter = strip_group(filter, Grammar::Clause).unwrap_or(filter);
        let filter = Self::parse_filter(filter)?;

        Ok(ParsedExpression {
            filter,
            sort_key: sort_key.to_string(),
            count,
        })
    }

    /// Parses a filter clause into a [`FilterNode`].
    ///
    /// # Errors
    ///
    /// Returns `FormatError::EmptyFilter` for an empty clause, and the leaf
    /// errors described on [`parse_leaf`](Self::parse_leaf).
    pub fn parse_filter(text: &str) -> ExpressionResult<FilterNode> {
        parse_logical(text, 0)
    }

    /// Parses a single `kind:value` leaf clause.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::MissingColon` if there is no `:`.
    ///
    /// Returns `FormatError::UnknownKind` if the kind is not recognized.
    ///
    /// Returns `FormatError::InvalidComparison` or `FormatError::InvalidBoolean`
    /// if the value does not match the grammar for its kind.
    pub fn parse_leaf(text: &str) -> ExpressionResult<FilterNode> {
        parse_leaf(text, 0)
    }

    /// Parses a genre, language or type value expression.
    ///
    /// The result is the bare value tree; wrap it with [`Field::group`] to
    /// get the node a `kind:value` leaf produces.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::EmptyTerm` if any term is empty.
    pub fn parse_field_expr(text: &str, field: Field) -> ExpressionResult<FilterNode> {
        parse_field_value(text, field, 0)
    }
}

/// Parses the count part: base-10 digits only.
fn parse_count(text: &str) -> ExpressionResult<usize> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormatError::invalid_count(text));
    }
    text.parse().map_err(|_| FormatError::invalid_count(text))
}

fn check_depth(depth: usize) -> ExpressionResult<()> {
    if depth > MAX_NESTING_DEPTH {
        Err(FormatError::TooDeep {
            max: MAX_NESTING_DEPTH,
        })
    } else {
        Ok(())
    }
}

/// Parses the clause grammar.
fn parse_logical(text: &str, depth: usize) -> ExpressionResult<FilterNode> {
    check_depth(depth)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(FormatError::EmptyFilter);
    }

    let parts = split_top_level(text, "AND", Grammar::Clause);
    if parts.len() >= 2 {
        return parse_all(&parts, |part| parse_logical(part, depth + 1)).map(FilterNode::And);
    }

    let parts = split_top_level(text, "OR", Grammar::Clause);
    if parts.len() >= 2 {
        return parse_all(&parts, |part| parse_logical(part, depth + 1)).map(FilterNode::Or);
    }

    if let Some(rest) = strip_not(text) {
        return parse_logical(rest, depth + 1).map(FilterNode::negate);
    }

    if let Some(inner) = strip_group(text, Grammar::Clause) {
        return parse_logical(inner, depth + 1);
    }

    parse_leaf(text, depth)
}

/// Parses the field-value grammar for `field`.
fn parse_field_value(text: &str, field: Field, depth: usize) -> ExpressionResult<FilterNode> {
    check_depth(depth)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(FormatError::empty_term(field.keyword()));
    }

    let parts = split_top_level(text, "AND", Grammar::FieldValue);
    if parts.len() >= 2 {
        return parse_all(&parts, |part| parse_field_value(part, field, depth + 1))
            .map(FilterNode::And);
    }

    let parts = split_top_level(text, "OR", Grammar::FieldValue);
    if parts.len() >= 2 {
        return parse_all(&parts, |part| parse_field_value(part, field, depth + 1))
            .map(FilterNode::Or);
    }

    if let Some(rest) = strip_not(text) {
        return parse_field_value(rest, field, depth + 1).map(FilterNode::negate);
    }

    if let Some(inner) = strip_group(text, Grammar::FieldValue) {
        return parse_field_value(inner, field, depth + 1);
    }

    Ok(field.term(text))
}

fn parse_all<F>(parts: &[&str], parse: F) -> ExpressionResult<Vec<FilterNode>>
where
    F: Fn(&str) -> ExpressionResult<FilterNode>,
{
    parts.iter().map(|part| parse(part)).collect()
}

/// Parses a `kind:value` leaf.
fn parse_leaf(text: &str, depth: usize) -> ExpressionResult<FilterNode> {
    let (kind, value) = text
        .split_once(':')
        .ok_or_else(|| FormatError::missing_colon(text))?;
    let kind = kind.trim();
    let value = value.trim();

    match kind.to_lowercase().as_str() {
        "genre" => parse_field_group(value, Field::Genre, depth),
        "language" => parse_field_group(value, Field::Language, depth),
        "type" => parse_field_group(value, Field::Type, depth),
        "length" => {
            let (op, minutes) = parse_comparison(kind, value, is_integer)?;
            Ok(FilterNode::RuntimeCompare { op, minutes })
        }
        "released" => {
            let (op, year) = parse_comparison(kind, value, is_year)?;
            Ok(FilterNode::ReleaseYearCompare { op, year })
        }
        "rating" => {
            let (op, value) = parse_comparison(kind, value, is_decimal)?;
            Ok(FilterNode::RatingCompare { op, value })
        }
        "watchstatus" => parse_watched(value),
        _ => Err(FormatError::unknown_kind(kind, suggest_kind(kind))),
    }
}

fn parse_field_group(value: &str, field: Field, depth: usize) -> ExpressionResult<FilterNode> {
    parse_field_value(value, field, depth + 1).map(|child| field.group(child))
}

/// Parses `<op><number>`, where `accepts` validates the number's shape
/// before it is converted.
fn parse_comparison<T: std::str::FromStr>(
    kind: &str,
    value: &str,
    accepts: fn(&str) -> bool,
) -> ExpressionResult<(ComparisonOp, T)> {
    let invalid = || FormatError::invalid_comparison(kind, value);

    let number_start = value
        .find(|c: char| !COMPARISON_CHARS.contains(&c))
        .unwrap_or(value.len());
    let (symbol, number) = value.split_at(number_start);

    let op = ComparisonOp::from_symbol(symbol).ok_or_else(invalid)?;
    if !accepts(number) {
        return Err(invalid());
    }
    let number = number.parse().map_err(|_| invalid())?;
    Ok((op, number))
}

fn is_integer(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn is_year(text: &str) -> bool {
    text.len() == 4 && is_integer(text)
}

fn is_decimal(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.matches('.').count() <= 1
}

fn parse_watched(value: &str) -> ExpressionResult<FilterNode> {
    if value.eq_ignore_ascii_case("true") {
        Ok(FilterNode::WatchedIs(true))
    } else if value.eq_ignore_ascii_case("false") {
        Ok(FilterNode::WatchedIs(false))
    } else {
        Err(FormatError::invalid_boolean(value))
    }
}

/// Finds the known leaf kind closest to `kind`, if it is close enough.
fn suggest_kind(kind: &str) -> Option<&'static str> {
    let kind_lower = kind.to_lowercase();
    let (best, distance) = LEAF_KINDS
        .iter()
        .map(|known| (*known, levenshtein(&kind_lower, known)))
        .min_by_key(|(_, distance)| *distance)?;

    (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then_some(best)
}
