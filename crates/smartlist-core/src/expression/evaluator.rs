//! Filter evaluation against content records.
//!
//! This module provides [`evaluate`] and the [`FilterEvaluator`] wrapper for
//! testing parsed filter trees against [`ContentRecord`]s.
//!
//! # Example
//!
//! ```
//! use smartlist_core::expression::{ExpressionParser, FilterEvaluator};
//! use smartlist_core::ContentRecord;
//!
//! let filter = ExpressionParser::parse_filter("genre:Action AND length:<=120").unwrap();
//!
//! let record = ContentRecord {
//!     genres: ["Action".to_string()].into_iter().collect(),
//!     runtime_minutes: Some(95),
//!     ..ContentRecord::new("1", "Heat", "Movie")
//! };
//!
//! let evaluator = FilterEvaluator::new(&filter);
//! assert!(evaluator.matches(&record));
//! ```

use super::ast::FilterNode;
use crate::model::ContentRecord;

/// Evaluates a filter tree against a record.
///
/// Evaluation is total: every tree the parser can produce is evaluable
/// against every record, and missing optional fields fall back to their
/// defaults. `And` and `Or` stop at the first child that decides the result,
/// visiting children left to right.
pub fn evaluate(node: &FilterNode, record: &ContentRecord) -> bool {
    evaluate_with(node, record, &mut |_: &FilterNode| {})
}

/// Evaluates `node`, calling `visit` on every node before it is evaluated.
pub(crate) fn evaluate_with<F>(node: &FilterNode, record: &ContentRecord, visit: &mut F) -> bool
where
    F: FnMut(&FilterNode),
{
    visit(node);
    match node {
        // Logical
        FilterNode::And(children) => children
            .iter()
            .all(|child| evaluate_with(child, record, visit)),
        FilterNode::Or(children) => children
            .iter()
            .any(|child| evaluate_with(child, record, visit)),
        FilterNode::Not(inner) => !evaluate_with(inner, record, visit),

        // Field groups delegate to their value expression
        FilterNode::GenreGroup(inner)
        | FilterNode::LanguageGroup(inner)
        | FilterNode::TypeGroup(inner) => evaluate_with(inner, record, visit),

        // Equality leaves
        FilterNode::GenreIs(genre) => record.genres.iter().any(|g| eq_ignore_case(g, genre)),
        FilterNode::LanguageIs(language) => record
            .language
            .as_deref()
            .is_some_and(|l| eq_ignore_case(l, language)),
        FilterNode::TypeIs(content_type) => eq_ignore_case(&record.content_type, content_type),

        // Numeric leaves
        FilterNode::RuntimeCompare { op, minutes } => {
            op.compare_int(record.runtime_minutes.unwrap_or(0), *minutes)
        }
        FilterNode::ReleaseYearCompare { op, year } => op.compare_int(
            i64::from(record.release_year.unwrap_or(0)),
            i64::from(*year),
        ),
        FilterNode::RatingCompare { op, value } => {
            op.compare_float(record.community_rating.unwrap_or(0.0), *value)
        }

        FilterNode::WatchedIs(watched) => record.watched == *watched,
    }
}

/// Case-insensitive string equality that does not allocate.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl FilterNode {
    /// Returns true if the record satisfies this filter.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        evaluate(self, record)
    }
}

/// Evaluates a parsed filter against records.
///
/// The evaluator only borrows the filter, so a single tree can back any
/// number of evaluators, including ones on other threads.
#[derive(Debug, Clone, Copy)]
pub struct FilterEvaluator<'a> {
    filter: &'a FilterNode,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new filter evaluator.
    pub fn new(filter: &'a FilterNode) -> Self {
        Self { filter }
    }

    /// Returns true if the record matches the filter.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        evaluate(self.filter, record)
    }

    /// Filters a slice of records, returning only those that match, in order.
    pub fn filter_items<'b>(&self, records: &'b [ContentRecord]) -> Vec<&'b ContentRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}
