//! Rule file storage with XDG path support.
//!
//! Rules are stored as JSON at `~/.local/share/smartlist/rules.json` (or the
//! platform equivalent). Storage is a plain key-value map from rule name to
//! rule: writes replace the whole file and the last write wins.
//!
//! Both synchronous and asynchronous I/O methods are provided:
//! - `save()`, `load()` - Synchronous methods using `std::fs`
//! - `save_async()`, `load_async()` - Asynchronous methods using `tokio::fs`

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rule::Rule;

/// Default rules filename.
const RULES_FILENAME: &str = "rules.json";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "smartlist";

/// Current rules file schema version.
const RULES_VERSION: u32 = 1;

/// Errors that can occur during rule storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error during file read.
    #[error("failed to read rules file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write rules file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during directory creation.
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for rule store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The persisted collection of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Schema version of the rules file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Rules in insertion order. Names are unique, compared case-insensitively.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_version() -> u32 {
    RULES_VERSION
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            rules: Vec::new(),
        }
    }
}

impl RuleSet {
    /// Finds a rule by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Rule> {
        let name_lower = name.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.name.to_lowercase() == name_lower)
    }

    /// Inserts a rule, replacing any rule with the same name in place.
    ///
    /// Returns the replaced rule, if any.
    pub fn upsert(&mut self, rule: Rule) -> Option<Rule> {
        let name_lower = rule.name.to_lowercase();
        match self
            .rules
            .iter_mut()
            .find(|r| r.name.to_lowercase() == name_lower)
        {
            Some(existing) => Some(std::mem::replace(existing, rule)),
            None => {
                self.rules.push(rule);
                None
            }
        }
    }

    /// Removes a rule by name (case-insensitive), returning it.
    pub fn remove(&mut self, name: &str) -> Option<Rule> {
        let name_lower = name.to_lowercase();
        let index = self
            .rules
            .iter()
            .position(|r| r.name.to_lowercase() == name_lower)?;
        Some(self.rules.remove(index))
    }

    /// Rule names, in storage order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Persistent storage for rules.
///
/// `RuleStore` reads and writes the rule set using XDG-compliant paths.
/// File operations are not locked: two processes saving at the same time
/// leave whichever write finished last.
///
/// # Example
///
/// ```no_run
/// use smartlist_core::{Rule, RuleStore};
///
/// let store = RuleStore::new()?;
/// let mut rules = store.load_or_default()?;
/// rules.upsert(Rule::new("Short films", vec!["{length:<=40 | random | 10}".to_string()]));
/// store.save(&rules)?;
/// # Ok::<(), smartlist_core::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RuleStore {
    /// Path to the rules file.
    path: PathBuf,
}

impl RuleStore {
    /// Creates a new `RuleStore` with the default XDG data path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        Ok(Self { path })
    }

    /// Creates a new `RuleStore` with a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the default XDG path for the rules file.
    ///
    /// On Unix: `~/.local/share/smartlist/rules.json`
    /// On macOS: `~/Library/Application Support/smartlist/rules.json`
    /// On Windows: `C:\Users\<User>\AppData\Roaming\smartlist\data\rules.json`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(StoreError::NoDataDir)?;

        Ok(project_dirs.data_dir().join(RULES_FILENAME))
    }

    /// Returns the path to the rules file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the rule set from disk.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::ReadError` if the file cannot be read.
    /// - Returns `StoreError::Json` if the file contains invalid JSON.
    pub fn load(&self) -> Result<RuleSet> {
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads the rule set, returning an empty set if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::ReadError` for I/O errors other than "file not found".
    /// - Returns `StoreError::Json` if the file contains invalid JSON.
    pub fn load_or_default(&self) -> Result<RuleSet> {
        match self.load() {
            Ok(rules) => Ok(rules),
            Err(StoreError::ReadError { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(RuleSet::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Saves the rule set to disk atomically.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::CreateDirError` if the directory cannot be created.
    /// - Returns `StoreError::WriteError` if the file cannot be written.
    /// - Returns `StoreError::Json` if serialization fails.
    pub fn save(&self, rules: &RuleSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(rules)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json).map_err(|e| StoreError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    /// Returns true if the rules file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    // =========================================================================
    // Async I/O Methods
    // =========================================================================

    /// Loads the rule set from disk asynchronously.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::ReadError` if the file cannot be read.
    /// - Returns `StoreError::Json` if the file contains invalid JSON.
    pub async fn load_async(&self) -> Result<RuleSet> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| StoreError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads the rule set asynchronously, returning an empty set if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::ReadError` for I/O errors other than "file not found".
    /// - Returns `StoreError::Json` if the file contains invalid JSON.
    pub async fn load_or_default_async(&self) -> Result<RuleSet> {
        match self.load_async().await {
            Ok(rules) => Ok(rules),
            Err(StoreError::ReadError { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(RuleSet::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Saves the rule set to disk asynchronously using atomic write.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::CreateDirError` if the directory cannot be created.
    /// - Returns `StoreError::WriteError` if the file cannot be written.
    /// - Returns `StoreError::Json` if serialization fails.
    pub async fn save_async(&self, rules: &RuleSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::CreateDirError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let json = serde_json::to_string_pretty(rules)?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| StoreError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rule(name: &str, expression: &str) -> Rule {
        Rule::new(name, vec![expression.to_string()])
    }

    // ==========================================================================
    // RuleSet Tests
    // ==========================================================================

    #[test]
    fn test_upsert_adds_then_replaces() {
        let mut rules = RuleSet::default();
        assert!(rules.upsert(rule("Action", "{genre:Action|rating|5}")).is_none());
        assert!(rules.upsert(rule("Comedy", "{genre:Comedy|rating|5}")).is_none());

        let replaced = rules.upsert(rule("action", "{genre:Action|random|10}"));
        assert_eq!(replaced.unwrap().name, "Action");
        assert_eq!(rules.names(), vec!["action", "Comedy"]);
        assert_eq!(
            rules.get("ACTION").unwrap().expressions,
            vec!["{genre:Action|random|10}"]
        );
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut rules = RuleSet::default();
        rules.upsert(rule("Horror", "{genre:Horror|random|5}"));

        assert!(rules.remove("horror").is_some());
        assert!(rules.remove("horror").is_none());
        assert!(rules.rules.is_empty());
    }

    // ==========================================================================
    // Synchronous I/O Tests
    // ==========================================================================

    #[test]
    fn test_default_path_returns_xdg_path() {
        let path = RuleStore::default_path().expect("should get default path");

        let path_str = path.to_string_lossy();
        assert!(
            path_str.contains("smartlist") && path_str.ends_with("rules.json"),
            "path should contain smartlist and rules.json: {}",
            path_str
        );
        assert!(path.is_absolute(), "path should be absolute: {:?}", path);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = RuleStore::with_path(dir.path().join("nested").join("rules.json"));

        let mut rules = RuleSet::default();
        rules.upsert(rule("Action", "{genre:Action|rating|5}"));
        store.save(&rules).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap(), rules);
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_load_or_default_for_missing_file() {
        let dir = tempdir().unwrap();
        let store = RuleStore::with_path(dir.path().join("rules.json"));

        let rules = store.load_or_default().unwrap();
        assert!(rules.rules.is_empty());
        assert_eq!(rules.version, RULES_VERSION);
    }

    #[test]
    fn test_read_error_includes_file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let store = RuleStore::with_path(path.clone());

        let err = store.load().unwrap_err();
        match &err {
            StoreError::ReadError { path: p, .. } => assert_eq!(p, &path),
            other => panic!("expected ReadError, got {other:?}"),
        }
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{ not json").unwrap();

        let store = RuleStore::with_path(path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        assert!(matches!(store.load_or_default(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_last_write_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let first = RuleStore::with_path(path.clone());
        let second = RuleStore::with_path(path);

        let mut a = RuleSet::default();
        a.upsert(rule("A", "{genre:A|rating|1}"));
        let mut b = RuleSet::default();
        b.upsert(rule("B", "{genre:B|rating|1}"));

        first.save(&a).unwrap();
        second.save(&b).unwrap();
        assert_eq!(first.load().unwrap().names(), vec!["B"]);
    }

    // ==========================================================================
    // Async I/O Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_save_and_load_async() {
        let dir = tempdir().unwrap();
        let store = RuleStore::with_path(dir.path().join("rules.json"));

        let mut rules = RuleSet::default();
        rules.upsert(rule("Short", "{length:<=40|random|10}"));
        store.save_async(&rules).await.unwrap();

        assert_eq!(store.load_async().await.unwrap(), rules);
    }

    #[tokio::test]
    async fn test_load_or_default_async_missing_file() {
        let dir = tempdir().unwrap();
        let store = RuleStore::with_path(dir.path().join("rules.json"));

        let rules = store.load_or_default_async().await.unwrap();
        assert!(rules.rules.is_empty());
    }
}
