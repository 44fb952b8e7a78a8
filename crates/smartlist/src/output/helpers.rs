//! Common helper functions for output formatting.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

/// Truncates an ID to 8 characters for display.
pub fn truncate_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a release year, or an empty string when unknown.
pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

/// Formats a community rating with one decimal.
pub fn format_rating(rating: Option<f64>, use_colors: bool) -> String {
    let Some(rating) = rating else {
        return String::new();
    };

    let label = format!("{rating:.1}");
    if use_colors {
        paint_rating(&label, rating)
    } else {
        label
    }
}

/// Colors already formatted rating text: green from 8.0, red below 5.0.
pub fn paint_rating(text: &str, rating: f64) -> String {
    if rating >= 8.0 {
        text.green().to_string()
    } else if rating < 5.0 {
        text.red().to_string()
    } else {
        text.to_string()
    }
}

/// Formats a runtime in minutes as `1h 52m`.
pub fn format_runtime(minutes: Option<i64>) -> String {
    match minutes {
        None => String::new(),
        Some(m) if m < 60 => format!("{m}m"),
        Some(m) => format!("{}h {:02}m", m / 60, m % 60),
    }
}

/// Formats a timestamp as a calendar date.
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Formats a rule's enabled flag.
pub fn format_enabled(enabled: bool, use_colors: bool) -> String {
    let label = if enabled { "enabled" } else { "disabled" };
    if use_colors {
        paint_enabled(label, enabled)
    } else {
        label.to_string()
    }
}

/// Colors already formatted status text: green when enabled, dimmed otherwise.
pub fn paint_enabled(text: &str, enabled: bool) -> String {
    if enabled {
        text.green().to_string()
    } else {
        text.dimmed().to_string()
    }
}

/// Formats a table header line.
pub fn format_header(header: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", header.dimmed())
    } else {
        format!("{header}\n")
    }
}

/// Formats a bold field label such as `Rule:`.
pub fn format_label(label: &str, use_colors: bool) -> String {
    if use_colors {
        label.bold().to_string()
    } else {
        label.to_string()
    }
}
