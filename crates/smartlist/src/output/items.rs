//! Item output formatting for previews.

use chrono::{DateTime, Utc};
use serde::Serialize;
use smartlist_core::{ContentRecord, ExpressionFailure};

use super::helpers::{
    format_date, format_header, format_rating, format_runtime, format_year, paint_rating,
    truncate_id, truncate_str,
};

/// JSON output structure for the preview command.
#[derive(Serialize)]
pub struct PreviewOutput<'a> {
    pub items: Vec<ItemOutput<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<FailureOutput>,
}

/// JSON output structure for a single item.
#[derive(Serialize)]
pub struct ItemOutput<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub content_type: &'a str,
    pub genres: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<i64>,
    pub watched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<&'a DateTime<Utc>>,
}

/// JSON output structure for an expression that was skipped.
#[derive(Serialize)]
pub struct FailureOutput {
    pub expression: String,
    pub error: String,
}

impl<'a> From<&'a ContentRecord> for ItemOutput<'a> {
    fn from(record: &'a ContentRecord) -> Self {
        Self {
            id: &record.id,
            name: &record.name,
            content_type: &record.content_type,
            genres: record.genres.iter().map(String::as_str).collect(),
            release_year: record.release_year,
            community_rating: record.community_rating,
            runtime_minutes: record.runtime_minutes,
            watched: record.watched,
            date_added: record.date_added.as_ref(),
        }
    }
}

impl From<&ExpressionFailure> for FailureOutput {
    fn from(failure: &ExpressionFailure) -> Self {
        Self {
            expression: failure.expression.clone(),
            error: failure.error.to_string(),
        }
    }
}

/// Formats preview results as JSON.
pub fn format_preview_json(
    items: &[&ContentRecord],
    failures: &[ExpressionFailure],
) -> Result<String, serde_json::Error> {
    let output = PreviewOutput {
        items: items.iter().map(|r| ItemOutput::from(*r)).collect(),
        skipped: failures.iter().map(FailureOutput::from).collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats preview results as a table.
pub fn format_preview_table(items: &[&ContentRecord], use_colors: bool) -> String {
    if items.is_empty() {
        return "No items matched.\n".to_string();
    }

    let mut output = format_header(
        &format!(
            "{:<8} {:<4} {:>6} {:>7} {:<10} {}",
            "ID", "Year", "Rating", "Runtime", "Added", "Name"
        ),
        use_colors,
    );

    for item in items {
        // Pad the plain text first; ANSI codes would throw the width off.
        let padded = format!("{:>6}", format_rating(item.community_rating, false));
        let rating = match item.community_rating {
            Some(value) if use_colors => paint_rating(&padded, value),
            _ => padded,
        };

        output.push_str(&format!(
            "{:<8} {:<4} {} {:>7} {:<10} {}\n",
            truncate_id(&item.id),
            format_year(item.release_year),
            rating,
            format_runtime(item.runtime_minutes),
            format_date(item.date_added.as_ref()),
            truncate_str(&item.name, 50),
        ));
    }

    output
}
