//! Content records consumed by the expression evaluator.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flattened, read-only view of a media item and the user's watch state.
///
/// Records are produced by a [`ContentSource`](crate::rule::ContentSource);
/// the expression engine only reads them. Optional fields that are missing
/// compare as zero in numeric filters and sort as the minimum value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Unique item identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Content type, e.g. `Movie` or `Episode`.
    #[serde(rename = "type", default)]
    pub content_type: String,

    /// Genres the item belongs to.
    #[serde(default)]
    pub genres: BTreeSet<String>,

    /// Runtime in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<i64>,

    /// Spoken language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Whether the requesting user has watched the item.
    #[serde(default)]
    pub watched: bool,

    /// Year of release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,

    /// Community rating, usually on a 0-10 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_rating: Option<f64>,

    /// When the item was added to the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// Creates a record with the given identity and no optional metadata.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content_type: content_type.into(),
            ..Self::default()
        }
    }
}
