//! Selection of records for a parsed expression: filter, sort, truncate.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use crate::expression::{FilterEvaluator, ParsedExpression};
use crate::model::ContentRecord;

/// Ordering applied to matching records before truncation.
///
/// Keys are parsed case-insensitively. Unknown keys keep the order the
/// content source returned. Records missing the sorted field sort as if the
/// value were zero (or the earliest possible date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// A fresh shuffle on every selection.
    Random,
    /// Name, A to Z, ignoring case.
    Alphabetical,
    /// Release year, oldest first.
    ReleaseDate,
    /// Release year, newest first.
    ReleaseDateDesc,
    /// Community rating, highest first.
    Rating,
    /// Date added to the library, newest first.
    DateAdded,
    /// Runtime, shortest first.
    Runtime,
    /// Runtime, longest first.
    RuntimeDesc,
    /// No reordering.
    SourceOrder,
}

impl SortKey {
    /// Parses a sort key, falling back to [`SortKey::SourceOrder`].
    pub fn parse(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "random" => SortKey::Random,
            "alphabetical" => SortKey::Alphabetical,
            "releasedate" => SortKey::ReleaseDate,
            "releasedate_desc" => SortKey::ReleaseDateDesc,
            "rating" => SortKey::Rating,
            "dateadded" => SortKey::DateAdded,
            "runtime" => SortKey::Runtime,
            "runtime_desc" => SortKey::RuntimeDesc,
            _ => SortKey::SourceOrder,
        }
    }

    /// The canonical rule-text spelling of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Random => "random",
            SortKey::Alphabetical => "alphabetical",
            SortKey::ReleaseDate => "releasedate",
            SortKey::ReleaseDateDesc => "releasedate_desc",
            SortKey::Rating => "rating",
            SortKey::DateAdded => "dateadded",
            SortKey::Runtime => "runtime",
            SortKey::RuntimeDesc => "runtime_desc",
            SortKey::SourceOrder => "none",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParsedExpression {
    /// The interpreted sort key.
    pub fn sort(&self) -> SortKey {
        SortKey::parse(&self.sort_key)
    }

    /// Selects records matching this expression, sorted and truncated to `count`.
    pub fn select<'a>(&self, records: &'a [ContentRecord]) -> Vec<&'a ContentRecord> {
        select(self, records)
    }
}

/// Applies an expression to a collection of records.
///
/// Matching records are sorted by the expression's sort key and truncated
/// to at most `count` items.
///
/// # Example
///
/// ```
/// use smartlist_core::expression::ExpressionParser;
/// use smartlist_core::{select, ContentRecord};
///
/// let records = vec![
///     ContentRecord { community_rating: Some(6.1), ..ContentRecord::new("1", "B", "Movie") },
///     ContentRecord { community_rating: Some(8.4), ..ContentRecord::new("2", "A", "Movie") },
/// ];
///
/// let expression = ExpressionParser::parse("{type:Movie | rating | 1}").unwrap();
/// let selected = select(&expression, &records);
/// assert_eq!(selected.len(), 1);
/// assert_eq!(selected[0].id, "2");
/// ```
pub fn select<'a>(expression: &ParsedExpression, records: &'a [ContentRecord]) -> Vec<&'a ContentRecord> {
    let evaluator = FilterEvaluator::new(&expression.filter);
    let mut matches = evaluator.filter_items(records);
    sort_records(&mut matches, expression.sort());
    matches.truncate(expression.count);
    matches
}

/// Sorts records in place by `key`.
///
/// All orderings except [`SortKey::Random`] are stable.
pub fn sort_records(records: &mut [&ContentRecord], key: SortKey) {
    match key {
        SortKey::Random => records.shuffle(&mut rand::thread_rng()),
        SortKey::Alphabetical => {
            records.sort_by_cached_key(|r| r.name.to_lowercase());
        }
        SortKey::ReleaseDate => records.sort_by_key(|r| release_year(r)),
        SortKey::ReleaseDateDesc => records.sort_by(|a, b| release_year(b).cmp(&release_year(a))),
        SortKey::Rating => records.sort_by(|a, b| compare_ratings(b, a)),
        SortKey::DateAdded => records.sort_by(|a, b| date_added(b).cmp(&date_added(a))),
        SortKey::Runtime => records.sort_by_key(|r| runtime(r)),
        SortKey::RuntimeDesc => records.sort_by(|a, b| runtime(b).cmp(&runtime(a))),
        SortKey::SourceOrder => {}
    }
}

fn release_year(record: &ContentRecord) -> i32 {
    record.release_year.unwrap_or(0)
}

fn runtime(record: &ContentRecord) -> i64 {
    record.runtime_minutes.unwrap_or(0)
}

fn date_added(record: &ContentRecord) -> DateTime<Utc> {
    record.date_added.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn compare_ratings(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    let a = a.community_rating.unwrap_or(0.0);
    let b = b.community_rating.unwrap_or(0.0);
    a.total_cmp(&b)
}

/// Merges several selections into one list, keeping the first occurrence
/// of each record id.
pub fn union_by_id<'a, I>(selections: I) -> Vec<&'a ContentRecord>
where
    I: IntoIterator<Item = Vec<&'a ContentRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for record in selections.into_iter().flatten() {
        if seen.insert(record.id.as_str()) {
            merged.push(record);
        }
    }
    merged
}
