//! Parsed expression output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use smartlist_core::expression::{FilterNode, ParsedExpression};

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ParsedOutput<'a> {
    /// Canonical rule text.
    pub expression: String,
    pub filter: &'a FilterNode,
    /// Sort key as written.
    pub sort: &'a str,
    /// Sort key as interpreted.
    pub sort_key: &'static str,
    pub count: usize,
}

/// Formats a parsed expression as JSON.
pub fn format_expression_json(parsed: &ParsedExpression) -> Result<String, serde_json::Error> {
    let output = ParsedOutput {
        expression: parsed.to_string(),
        filter: &parsed.filter,
        sort: &parsed.sort_key,
        sort_key: parsed.sort().as_str(),
        count: parsed.count,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a parsed expression as an indented outline.
///
/// ```text
/// AND
///   genre = Action
///   NOT
///     released < 2000
/// sort: rating
/// count: 20
/// ```
pub fn format_expression_tree(parsed: &ParsedExpression, use_colors: bool) -> String {
    let mut output = String::new();
    write_node(&mut output, &parsed.filter, 0, use_colors);
    output.push_str(&format!("sort: {}\n", parsed.sort()));
    output.push_str(&format!("count: {}\n", parsed.count));
    output
}

fn write_node(out: &mut String, node: &FilterNode, depth: usize, use_colors: bool) {
    let indent = "  ".repeat(depth);
    let keyword = |word: &str| {
        if use_colors {
            word.cyan().bold().to_string()
        } else {
            word.to_string()
        }
    };

    match node {
        FilterNode::And(children) | FilterNode::Or(children) => {
            let word = if matches!(node, FilterNode::And(_)) {
                "AND"
            } else {
                "OR"
            };
            out.push_str(&format!("{indent}{}\n", keyword(word)));
            for child in children {
                write_node(out, child, depth + 1, use_colors);
            }
        }
        FilterNode::Not(inner) => {
            out.push_str(&format!("{indent}{}\n", keyword("NOT")));
            write_node(out, inner, depth + 1, use_colors);
        }
        FilterNode::GenreGroup(inner)
        | FilterNode::LanguageGroup(inner)
        | FilterNode::TypeGroup(inner)
            if is_term(inner) =>
        {
            write_node(out, inner, depth, use_colors);
        }
        FilterNode::GenreGroup(inner)
        | FilterNode::LanguageGroup(inner)
        | FilterNode::TypeGroup(inner) => {
            let field = match node {
                FilterNode::GenreGroup(_) => "genre",
                FilterNode::LanguageGroup(_) => "language",
                _ => "type",
            };
            out.push_str(&format!("{indent}{}\n", keyword(&format!("{field}:"))));
            write_node(out, inner, depth + 1, use_colors);
        }
        _ => out.push_str(&format!("{indent}{}\n", describe_leaf(node))),
    }
}

fn is_term(node: &FilterNode) -> bool {
    matches!(
        node,
        FilterNode::GenreIs(_) | FilterNode::LanguageIs(_) | FilterNode::TypeIs(_)
    )
}

/// Describes a leaf node as `field op value`.
fn describe_leaf(node: &FilterNode) -> String {
    match node {
        FilterNode::GenreIs(value) => format!("genre = {value}"),
        FilterNode::LanguageIs(value) => format!("language = {value}"),
        FilterNode::TypeIs(value) => format!("type = {value}"),
        FilterNode::RuntimeCompare { op, minutes } => format!("length {op} {minutes}"),
        FilterNode::ReleaseYearCompare { op, year } => format!("released {op} {year}"),
        FilterNode::RatingCompare { op, value } => format!("rating {op} {value}"),
        FilterNode::WatchedIs(value) => format!("watchstatus = {value}"),
        other => other.to_string(),
    }
}
