//! JSON file content source.
//!
//! The catalog file holds every media record plus optional per-user watch
//! state:
//!
//! ```json
//! {
//!   "items": [{ "id": "1", "name": "Alien", "type": "Movie", "genres": ["Horror"] }],
//!   "watched": { "alice": ["1"] }
//! }
//! ```
//!
//! When a rule names a user listed under `watched`, each record's `watched`
//! flag is replaced by membership in that user's list.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ContentRecord;
use crate::rule::{BoxError, ContentSource};

/// Errors that can occur while reading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// I/O error during file read.
    #[error("failed to read catalog file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The catalog file is not valid JSON.
    #[error("invalid catalog file '{path}': {source}")]
    Json {
        /// The path that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk catalog contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// All media records.
    #[serde(default)]
    pub items: Vec<ContentRecord>,

    /// Watched item ids per user.
    #[serde(default)]
    pub watched: HashMap<String, HashSet<String>>,
}

impl Catalog {
    /// Returns the records as seen by `user`.
    pub fn items_for(&self, user: Option<&str>) -> Vec<ContentRecord> {
        let watched = user.and_then(|u| self.watched.get(u));
        self.items
            .iter()
            .map(|item| match watched {
                Some(ids) => ContentRecord {
                    watched: ids.contains(&item.id),
                    ..item.clone()
                },
                None => item.clone(),
            })
            .collect()
    }
}

/// A [`ContentSource`] backed by a JSON catalog file.
///
/// The file is re-read on every fetch so edits are picked up without a restart.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// Creates a catalog source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the catalog file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the catalog from disk.
    ///
    /// # Errors
    ///
    /// - Returns `CatalogError::ReadError` if the file cannot be read.
    /// - Returns `CatalogError::Json` if the file contains invalid JSON.
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::ReadError {
                path: self.path.clone(),
                source: e,
            })?;
        serde_json::from_str(&contents).map_err(|e| CatalogError::Json {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl ContentSource for JsonCatalog {
    async fn fetch_items(&self, user: Option<&str>) -> Result<Vec<ContentRecord>, BoxError> {
        let catalog = self.load().await?;
        Ok(catalog.items_for(user))
    }
}
