//! Local object storage.
//!
//! Uploaded documents, templates and generated files are written below one
//! root directory and served read-only under a public URL prefix. Object paths
//! are always relative, never contain `..`, and start with a random folder so
//! uploads with the same file name never overwrite each other.

use crate::{
    config::app::StorageConfig,
    errors::{Error, Result},
};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Path relative to the storage root
    pub path: String,
    /// Public URL the object is served from
    pub url: String,
}

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Creates a store rooted at `config.root_dir`.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Root directory objects are written under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL of an object path.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    /// Writes `bytes` as `<folder>/<uuid>/<file_name>`.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, folder: &str, file_name: &str, bytes: &[u8]) -> Result<StoredObject> {
        let folder = sanitize_segment(folder)?;
        let file_name = sanitize_segment(file_name)?;
        let path = format!("{folder}/{}/{file_name}", Uuid::new_v4().simple());

        let full = self.resolve(&path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        debug!(%path, "Object stored");

        Ok(StoredObject {
            url: self.public_url(&path),
            path,
        })
    }

    /// Reads an object back.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        tokio::fs::read(full).await.map_err(Into::into)
    }

    /// Deletes an object; a missing object is not an error.
    pub async fn remove(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.is_empty() {
            return Err(Error::validation(format!("Invalid object path: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

fn sanitize_segment(segment: &str) -> Result<String> {
    let cleaned: String = segment
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        return Err(Error::validation("Object name cannot be empty"));
    }
    Ok(cleaned)
}
