use relative_path::{RelativePath, RelativePathBuf};

use crate::paths::MARKDOWN_EXTENSION;

/// A markdown document identified by its corpus-relative path, with a
/// display-friendly name derived from the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
    relative_path: RelativePathBuf,
    display_name: String,
}

impl MarkdownFile {
    /// Create a new MarkdownFile from a relative path
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let display_name = Self::extract_display_name(&relative_path);
        Self {
            relative_path,
            display_name,
        }
    }

    /// Create from a relative path string
    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    /// Get the relative path
    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// The file name without its markdown extension, used as link display
    /// text when titles follow renames.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    fn extract_display_name(path: &RelativePath) -> String {
        let suffix = format!(".{MARKDOWN_EXTENSION}");
        path.file_name()
            .map(|name| name.strip_suffix(suffix.as_str()).unwrap_or(name))
            .unwrap_or("Untitled")
            .to_string()
    }
}

impl From<RelativePathBuf> for MarkdownFile {
    fn from(path: RelativePathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for MarkdownFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}
