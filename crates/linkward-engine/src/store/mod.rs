use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::MARKDOWN_EXTENSION;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(RelativePathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Capability set the rewrite engine needs from a document corpus.
///
/// Passed in explicitly rather than reached through globals so the engine
/// can be exercised against an in-memory store in tests.
pub trait DocumentStore {
    /// All tracked markdown documents, corpus-relative, in stable order.
    fn list_documents(&self) -> Result<Vec<RelativePathBuf>, StoreError>;

    /// All files of any kind, corpus-relative, for existence checks.
    fn list_files(&self) -> Result<Vec<RelativePathBuf>, StoreError>;

    /// Full text of one document; `NotFound` if it is not in the store.
    fn read(&self, doc: &RelativePath) -> Result<String, StoreError>;

    /// Replaces the full text of one document.
    fn write(&self, doc: &RelativePath, text: &str) -> Result<(), StoreError>;
}

/// A notes directory on disk, the standard [`DocumentStore`].
pub struct NotesDir {
    root: PathBuf,
}

impl NotesDir {
    /// Opens `root` as a notes directory, validating that it exists.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.exists() || !root.is_dir() {
            return Err(StoreError::InvalidNotesDir(format!(
                "notes directory not found: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan(&self, markdown_only: bool) -> Result<Vec<RelativePathBuf>, StoreError> {
        let mut files = Vec::new();
        self.scan_directory(&self.root, markdown_only, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn scan_directory(
        &self,
        dir: &Path,
        markdown_only: bool,
        files: &mut Vec<RelativePathBuf>,
    ) -> Result<(), StoreError> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.scan_directory(&path, markdown_only, files)?;
            } else if !markdown_only
                || path
                    .extension()
                    .is_some_and(|ext| ext == MARKDOWN_EXTENSION)
            {
                files.push(self.relative_to_root(&path));
            }
        }
        Ok(())
    }

    fn relative_to_root(&self, path: &Path) -> RelativePathBuf {
        let stripped = path.strip_prefix(&self.root).unwrap_or(path);
        RelativePathBuf::from(stripped.to_string_lossy().replace('\\', "/"))
    }
}

impl DocumentStore for NotesDir {
    fn list_documents(&self) -> Result<Vec<RelativePathBuf>, StoreError> {
        self.scan(true)
    }

    fn list_files(&self) -> Result<Vec<RelativePathBuf>, StoreError> {
        self.scan(false)
    }

    fn read(&self, doc: &RelativePath) -> Result<String, StoreError> {
        let absolute = doc.to_path(&self.root);
        if !absolute.exists() {
            return Err(StoreError::NotFound(doc.to_relative_path_buf()));
        }
        Ok(fs::read_to_string(&absolute)?)
    }

    fn write(&self, doc: &RelativePath, text: &str) -> Result<(), StoreError> {
        let absolute = doc.to_path(&self.root);
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::write(&absolute, text)?)
    }
}
