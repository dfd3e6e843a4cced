//! JSON document persistence.
//!
//! A [`DocumentStore`] moves raw text in and out of storage; [`read_document`]
//! and [`write_document`] layer JSON parsing and the default-on-missing policy
//! on top of it. The filesystem backend is used in production, the in-memory
//! one in tests.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::error::plugin_error::ConfigCorruptSnafu;
use crate::error::plugin_error::IoSnafu;
use crate::error::plugin_error::SerializeSnafu;

/// Raw storage for JSON documents addressed by path.
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Read a document. Returns `None` when it does not exist.
    fn read_raw(&self, path: &Path) -> Result<Option<String>>;

    /// Replace a document, creating parent directories as needed.
    fn write_raw(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Read and parse a document, returning `default` when it does not exist.
///
/// A document that exists but is not valid JSON, or does not match `T`,
/// fails with `ConfigCorrupt` naming the path. Whitespace-only files count
/// as missing.
pub fn read_document<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &Path,
    default: T,
) -> Result<T> {
    let Some(content) = store.read_raw(path)? else {
        debug!(path = %path.display(), "Document not found, using default");
        return Ok(default);
    };

    if content.trim().is_empty() {
        debug!(path = %path.display(), "Document is empty, using default");
        return Ok(default);
    }

    serde_json::from_str(&content).map_err(|e| {
        ConfigCorruptSnafu {
            path: absolute(path),
            message: e.to_string(),
        }
        .build()
    })
}

/// Serialize and write a whole document.
pub fn write_document<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    path: &Path,
    document: &T,
) -> Result<()> {
    let mut content = serde_json::to_string_pretty(document).map_err(|e| {
        SerializeSnafu {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
        .build()
    })?;
    content.push('\n');
    store.write_raw(path, &content)
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Filesystem-backed documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn read_raw(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), bytes = content.len(), "Read document");
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => IoSnafu {
                path: path.to_path_buf(),
                message: format!("Failed to read: {e}"),
            }
            .fail(),
        }
    }

    fn write_raw(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IoSnafu {
                    path: parent.to_path_buf(),
                    message: format!("Failed to create directory: {e}"),
                }
                .build()
            })?;
        }

        // Write next to the target and rename so readers never see a torn file.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            IoSnafu {
                path: dir.to_path_buf(),
                message: format!("Failed to create temp file: {e}"),
            }
            .build()
        })?;
        tmp.write_all(contents.as_bytes()).map_err(|e| {
            IoSnafu {
                path: tmp.path().to_path_buf(),
                message: format!("Failed to write: {e}"),
            }
            .build()
        })?;
        tmp.persist(path).map_err(|e| {
            IoSnafu {
                path: path.to_path_buf(),
                message: format!("Failed to replace: {}", e.error),
            }
            .build()
        })?;

        debug!(path = %path.display(), bytes = contents.len(), "Wrote document");
        Ok(())
    }
}

/// In-memory documents keyed by path.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a document.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.lock().insert(path.into(), contents.into());
    }

    /// Current raw contents of a document.
    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, String>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read_raw(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.get(path))
    }

    fn write_raw(&self, path: &Path, contents: &str) -> Result<()> {
        self.insert(path, contents);
        Ok(())
    }
}

#[cfg(test)]
#[path = "document.test.rs"]
mod tests;
