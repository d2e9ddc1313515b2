use relative_path::{RelativePath, RelativePathBuf};
use thiserror::Error;

/// File extension of tracked markdown documents, without the dot.
pub const MARKDOWN_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path has no parent directory to resolve against: {0}")]
    NoParent(RelativePathBuf),
}

/// Normalizes a link or file path to its canonical corpus-relative form.
///
/// Backslashes become forward slashes, empty and `.` segments are dropped
/// and `..` segments are resolved where possible; unresolvable `..` segments
/// stay at the front. Normalizing an already-normalized path returns it
/// unchanged.
pub fn normalize(path: &str) -> RelativePathBuf {
    let forward = path.replace('\\', "/");

    let mut leading_ups = 0usize;
    let mut parts: Vec<&str> = Vec::new();
    for segment in forward.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    leading_ups += 1;
                }
            }
            name => parts.push(name),
        }
    }

    let mut segments: Vec<&str> = vec![".."; leading_ups];
    segments.extend(parts);
    RelativePathBuf::from(segments.join("/"))
}

/// Resolves a link target written inside `owning_doc` to a canonical path.
///
/// Targets are interpreted relative to the directory containing the owning
/// document, never relative to the corpus root. Fails only when the owning
/// path has no directory component to resolve against, which normal corpus
/// paths always have.
pub fn resolve_link(
    link_target: &str,
    owning_doc: &RelativePath,
) -> Result<RelativePathBuf, PathError> {
    let owning = normalize(owning_doc.as_str());
    let Some(parent) = parent_of(&owning) else {
        return Err(PathError::NoParent(owning));
    };
    Ok(normalize(&format!("{parent}/{link_target}")))
}

/// Computes the link text that points at `to` from inside `from_doc`.
///
/// The walk is computed over the document path itself, so its file name
/// accounts for one parent step, and the single leading `../` this produces
/// is then stripped. The emitted link therefore reads relative to the
/// document's directory: same-directory targets come out bare, deeper
/// crossings keep their remaining `../` prefix. Output is always
/// forward-slashed regardless of host conventions.
pub fn relative_link(from_doc: &RelativePath, to: &RelativePath) -> String {
    let from = normalize(from_doc.as_str());
    let to = normalize(to.as_str());

    let from_parts: Vec<&str> = split_segments(&from);
    let to_parts: Vec<&str> = split_segments(&to);
    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from_parts.len() - common];
    segments.extend(&to_parts[common..]);
    let link = segments.join("/");

    match link.strip_prefix("../") {
        Some(stripped) => stripped.to_string(),
        None => link,
    }
}

/// Replaces the file name of `path` with `new_base`, keeping the directory
/// and the extension.
pub fn with_renamed_base(path: &RelativePath, new_base: &str) -> RelativePathBuf {
    let normalized = normalize(path.as_str());
    let file_name = match normalized.extension() {
        Some(ext) => format!("{new_base}.{ext}"),
        None => new_base.to_string(),
    };
    let parent = parent_of(&normalized).unwrap_or("");
    normalize(&format!("{parent}/{file_name}"))
}

/// Everything up to the final segment, or `None` for an empty path.
fn parent_of(path: &RelativePath) -> Option<&str> {
    let s = path.as_str();
    if s.is_empty() {
        return None;
    }
    Some(match s.rfind('/') {
        Some(idx) => &s[..idx],
        None => "",
    })
}

fn split_segments(path: &RelativePath) -> Vec<&str> {
    path.as_str().split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("notes/a.md", "notes/a.md")]
    #[case("./notes/a.md", "notes/a.md")]
    #[case("notes\\a.md", "notes/a.md")]
    #[case("notes//a.md", "notes/a.md")]
    #[case("notes/../archive/b.md", "archive/b.md")]
    #[case("../outside.md", "../outside.md")]
    fn normalize_produces_canonical_form(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), RelativePathBuf::from(expected));
    }

    #[rstest]
    #[case("notes/a.md")]
    #[case("a.md")]
    #[case("deep/nested/dir/file.md")]
    #[case("../up.md")]
    fn normalization_is_idempotent(#[case] input: &str) {
        let once = normalize(input);
        let twice = normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn resolve_link_joins_onto_owning_directory() {
        let resolved = resolve_link("b.md", RelativePath::new("notes/a.md")).unwrap();
        assert_eq!(resolved, RelativePathBuf::from("notes/b.md"));
    }

    #[test]
    fn resolve_link_steps_out_of_owning_directory() {
        let resolved = resolve_link("../archive/b.md", RelativePath::new("notes/a.md")).unwrap();
        assert_eq!(resolved, RelativePathBuf::from("archive/b.md"));
    }

    #[test]
    fn resolve_link_from_corpus_root_document() {
        let resolved = resolve_link("notes/b.md", RelativePath::new("a.md")).unwrap();
        assert_eq!(resolved, RelativePathBuf::from("notes/b.md"));
    }

    #[test]
    fn resolve_link_normalizes_backslashes_in_targets() {
        let resolved = resolve_link("sub\\c.md", RelativePath::new("notes/a.md")).unwrap();
        assert_eq!(resolved, RelativePathBuf::from("notes/sub/c.md"));
    }

    #[test]
    fn resolve_link_fails_without_a_parent() {
        let result = resolve_link("b.md", RelativePath::new(""));
        assert!(matches!(result, Err(PathError::NoParent(_))));
    }

    #[rstest]
    #[case("notes/a.md", "notes/b.md", "b.md")]
    #[case("notes/a.md", "archive/b.md", "../archive/b.md")]
    #[case("notes/a.md", "notes/sub/c.md", "sub/c.md")]
    #[case("a/b/c.md", "x/y.md", "../../x/y.md")]
    #[case("a.md", "b.md", "b.md")]
    #[case("a.md", "notes/b.md", "notes/b.md")]
    fn relative_link_between_documents(
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(
            relative_link(RelativePath::new(from), RelativePath::new(to)),
            expected
        );
    }

    #[rstest]
    #[case("notes/a.md", "notes/b.md")]
    #[case("notes/a.md", "archive/b.md")]
    #[case("notes/a.md", "notes/sub/c.md")]
    #[case("a/b/c.md", "x/y.md")]
    #[case("a.md", "attachments/img.png")]
    fn relative_then_resolve_round_trips(#[case] from: &str, #[case] to: &str) {
        let link = relative_link(RelativePath::new(from), RelativePath::new(to));
        let resolved = resolve_link(&link, RelativePath::new(from)).unwrap();
        assert_eq!(resolved, normalize(to));
    }

    #[test]
    fn renamed_base_keeps_directory_and_extension() {
        let renamed = with_renamed_base(RelativePath::new("notes/old-name.md"), "new-name");
        assert_eq!(renamed, RelativePathBuf::from("notes/new-name.md"));
    }

    #[test]
    fn renamed_base_without_extension() {
        let renamed = with_renamed_base(RelativePath::new("notes/README"), "CHANGELOG");
        assert_eq!(renamed, RelativePathBuf::from("notes/CHANGELOG"));
    }

    #[test]
    fn renamed_base_at_corpus_root() {
        let renamed = with_renamed_base(RelativePath::new("a.md"), "b");
        assert_eq!(renamed, RelativePathBuf::from("b.md"));
    }
}
