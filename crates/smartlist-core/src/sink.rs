//! Directory-backed playlist sink.
//!
//! Each created playlist is written as `<dir>/<id>.json`, where `id` is a
//! freshly generated UUID.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::rule::{BoxError, PlaylistSink};

/// Errors that can occur while writing a playlist.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error during directory creation.
    #[error("failed to create playlist directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write playlist file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A persisted playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owner, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Item ids in playback order.
    pub items: Vec<String>,
    /// When the playlist was written.
    pub created_at: DateTime<Utc>,
}

/// A [`PlaylistSink`] that writes one JSON file per playlist.
#[derive(Debug, Clone)]
pub struct DirectoryPlaylistSink {
    dir: PathBuf,
}

impl DirectoryPlaylistSink {
    /// Creates a sink writing into `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the playlist directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a playlist file and returns the stored playlist.
    ///
    /// Uses atomic write (tempfile + rename) so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// - Returns `SinkError::CreateDirError` if the directory cannot be created.
    /// - Returns `SinkError::WriteError` if the file cannot be written.
    /// - Returns `SinkError::Json` if serialization fails.
    pub async fn write(
        &self,
        name: &str,
        user: Option<&str>,
        item_ids: &[String],
    ) -> Result<Playlist, SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SinkError::CreateDirError {
                path: self.dir.clone(),
                source: e,
            })?;

        let playlist = Playlist {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            user: user.map(str::to_string),
            items: item_ids.to_vec(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&playlist)?;

        let path = self.dir.join(format!("{}.json", playlist.id));
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| SinkError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| SinkError::WriteError {
                path: path.clone(),
                source: e,
            })?;

        Ok(playlist)
    }
}

impl PlaylistSink for DirectoryPlaylistSink {
    async fn create_playlist(
        &self,
        name: &str,
        user: Option<&str>,
        item_ids: &[String],
    ) -> Result<String, BoxError> {
        let playlist = self.write(name, user, item_ids).await?;
        Ok(playlist.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_playlist_writes_file() {
        let dir = tempdir().unwrap();
        let sink = DirectoryPlaylistSink::new(dir.path().join("playlists"));
        let ids = vec!["a".to_string(), "b".to_string()];

        let id = sink.create_playlist("Weekend", Some("alice"), &ids).await.unwrap();

        let path = sink.dir().join(format!("{id}.json"));
        let contents = std::fs::read_to_string(&path).unwrap();
        let playlist: Playlist = serde_json::from_str(&contents).unwrap();
        assert_eq!(playlist.id, id);
        assert_eq!(playlist.name, "Weekend");
        assert_eq!(playlist.user.as_deref(), Some("alice"));
        assert_eq!(playlist.items, ids);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_each_playlist_gets_unique_id() {
        let dir = tempdir().unwrap();
        let sink = DirectoryPlaylistSink::new(dir.path());

        let first = sink.create_playlist("A", None, &[]).await.unwrap();
        let second = sink.create_playlist("A", None, &[]).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_create_dir_error_includes_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let sink = DirectoryPlaylistSink::new(blocker.join("playlists"));
        let err = sink.write("A", None, &[]).await.unwrap_err();
        assert!(matches!(err, SinkError::CreateDirError { .. }));
        assert!(err.to_string().contains("playlists"));
    }
}
