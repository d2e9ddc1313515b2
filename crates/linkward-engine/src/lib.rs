pub mod models;
pub mod paths;
pub mod rewrite;
pub mod scanning;
pub mod store;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use models::MarkdownFile;
pub use paths::{
    MARKDOWN_EXTENSION, PathError, normalize, relative_link, resolve_link, with_renamed_base,
};
pub use rewrite::{PathChange, RewriteError, Rewriter};
pub use scanning::{LinkOccurrence, Links, Span, scan_links};
pub use store::{DocumentStore, NotesDir, StoreError};
