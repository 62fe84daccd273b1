//! File-based data source.
//!
//! Serves a surface from a JSON file on disk, re-read on every fetch.
//! Used for offline demos and fixtures (`--file-dir`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DataSource, FetchError, SourceKind};

/// A data source that reads a surface's JSON from a file.
///
/// The file is read on each fetch so edits show up on the next cycle. A
/// missing or unreadable file is reported as a network failure, the same
/// way an unreachable endpoint would be.
#[derive(Debug)]
pub struct FileSource {
    kind: SourceKind,
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(kind: SourceKind, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            kind,
            path,
            description,
        }
    }

    /// Create a file source for `<dir>/<kind>.json`.
    pub fn in_dir<P: AsRef<Path>>(kind: SourceKind, dir: P) -> Self {
        Self::new(kind, dir.as_ref().join(format!("{}.json", kind.name())))
    }

    /// Returns the path being served.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}
