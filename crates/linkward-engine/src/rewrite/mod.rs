use relative_path::{RelativePath, RelativePathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::MarkdownFile;
use crate::paths::{self, MARKDOWN_EXTENSION, PathError};
use crate::scanning::{LinkOccurrence, scan_links};
use crate::store::{DocumentStore, StoreError};

/// One pending move or rename. Both sides are canonical corpus-relative
/// paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub old_path: RelativePathBuf,
    pub new_path: RelativePathBuf,
}

impl PathChange {
    pub fn new(
        old_path: impl Into<RelativePathBuf>,
        new_path: impl Into<RelativePathBuf>,
    ) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    /// The named document is not in the store.
    #[error("document not found: {0}")]
    NotFound(RelativePathBuf),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RewriteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => RewriteError::NotFound(path),
            other => RewriteError::Store(other),
        }
    }
}

/// Applies link rewrites against documents held in a [`DocumentStore`].
///
/// Holds no state between calls; every entry point re-reads the documents it
/// touches, so results always reflect the corpus as it is right now.
/// Documents are processed one at a time, fully read, rewritten and written
/// back before the next is considered, and failures are isolated to the
/// single document they occur in.
pub struct Rewriter<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> Rewriter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Rewrites the links in `doc` whose resolved targets appear in `changes`.
    ///
    /// Each occurrence is resolved against the document's own path and
    /// matched against the changes in order; the first match wins. When
    /// `rename_titles` is set and the new link points at a markdown document,
    /// the display text is replaced with the new file's display name.
    /// Replacement is span-based, so two occurrences with identical raw text
    /// cannot collide. Writes back at most once, and only if something
    /// changed; a document with no matching links is left byte-identical.
    ///
    /// Returns whether the document was written.
    pub fn apply_path_changes(
        &self,
        doc: &RelativePath,
        changes: &[PathChange],
        rename_titles: bool,
    ) -> Result<bool, RewriteError> {
        let text = self.read_document(doc)?;

        let mut edits = Vec::new();
        for occurrence in scan_links(&text) {
            let resolved = paths::resolve_link(&occurrence.target, doc)?;
            let Some(change) = changes
                .iter()
                .find(|change| resolved == paths::normalize(change.old_path.as_str()))
            else {
                continue;
            };

            let new_link = paths::relative_link(doc, &change.new_path);
            let display_text = if rename_titles && is_markdown_link(&new_link) {
                MarkdownFile::new(paths::normalize(&new_link))
                    .display_name()
                    .to_string()
            } else {
                occurrence.display_text.clone()
            };

            debug!(
                document = %doc,
                old_target = %occurrence.target,
                %new_link,
                "rewriting link"
            );
            edits.push((occurrence.span, format!("[{display_text}]({new_link})")));
        }

        if edits.is_empty() {
            return Ok(false);
        }

        // Spans are non-overlapping and in text order, so the updated text
        // is stitched together in a single left-to-right pass.
        let mut updated = String::with_capacity(text.len());
        let mut tail = 0;
        for (span, replacement) in &edits {
            updated.push_str(&text[tail..span.start]);
            updated.push_str(replacement);
            tail = span.end;
        }
        updated.push_str(&text[tail..]);

        self.store.write(doc, &updated)?;
        Ok(true)
    }

    /// Single-move convenience over [`Rewriter::apply_path_changes`].
    pub fn apply_path_change(
        &self,
        doc: &RelativePath,
        old_path: &RelativePath,
        new_path: &RelativePath,
        rename_titles: bool,
    ) -> Result<bool, RewriteError> {
        let changes = [PathChange::new(old_path.as_str(), new_path.as_str())];
        self.apply_path_changes(doc, &changes, rename_titles)
    }

    /// Returns every link occurrence in `doc` without mutating anything.
    pub fn find_links(&self, doc: &RelativePath) -> Result<Vec<LinkOccurrence>, RewriteError> {
        let text = self.read_document(doc)?;
        Ok(scan_links(&text).collect())
    }

    /// Finds every document whose links resolve to `target`.
    ///
    /// Walks the whole store on every call; nothing is cached, so the answer
    /// is always fresh at the cost of re-reading everything. A document that
    /// cannot be read is logged and skipped, and the sweep continues.
    pub fn find_documents_linking_to(
        &self,
        target: &RelativePath,
    ) -> Result<Vec<RelativePathBuf>, RewriteError> {
        let target = paths::normalize(target.as_str());
        let mut referencing = Vec::new();

        for doc in self.store.list_documents()? {
            let occurrences = match self.find_links(&doc) {
                Ok(occurrences) => occurrences,
                Err(err) => {
                    warn!(document = %doc, error = %err, "skipping unreadable document");
                    continue;
                }
            };
            let links_to_target = occurrences.iter().any(|occurrence| {
                paths::resolve_link(&occurrence.target, &doc)
                    .map(|resolved| resolved == target)
                    .unwrap_or(false)
            });
            if links_to_target && !referencing.contains(&doc) {
                referencing.push(doc);
            }
        }

        Ok(referencing)
    }

    fn read_document(&self, doc: &RelativePath) -> Result<String, RewriteError> {
        self.store.read(doc).map_err(|err| {
            let err = RewriteError::from(err);
            if matches!(err, RewriteError::NotFound(_)) {
                warn!(document = %doc, "document not found");
            }
            err
        })
    }
}

fn is_markdown_link(link: &str) -> bool {
    paths::normalize(link).extension() == Some(MARKDOWN_EXTENSION)
}
