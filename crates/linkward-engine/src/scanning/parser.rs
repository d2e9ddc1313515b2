use super::cursor::Cursor;
use super::kinds::MarkdownLink;
use super::types::{LinkOccurrence, Span};

/// Scans `text` for `[display](target)` links, left to right.
///
/// The returned iterator is lazy and holds no state beyond its position in
/// `text`; calling `scan_links` again restarts from the beginning. Matches
/// never overlap, and a text without links yields an empty sequence.
///
/// # Escape tolerance
/// A backslash immediately before `[`, `]` or `)` is absorbed into the match
/// rather than suppressing it, so `\[doc\](a.md)` is still recognized as a
/// link to `a.md`. Strict markdown escaping semantics are deliberately not
/// applied here; callers that need to distinguish genuinely escaped links
/// must do so on top of the raw span.
pub fn scan_links(text: &str) -> Links<'_> {
    Links {
        cur: Cursor::new(text),
    }
}

/// Lazy iterator over the link occurrences in one text buffer.
pub struct Links<'a> {
    cur: Cursor<'a>,
}

impl Iterator for Links<'_> {
    type Item = LinkOccurrence;

    fn next(&mut self) -> Option<LinkOccurrence> {
        while !self.cur.eof() {
            if let Some(occurrence) = try_parse_link(&mut self.cur) {
                return Some(occurrence);
            }
            self.cur.bump();
        }
        None
    }
}

/// Attempts to parse a link starting at the current position.
///
/// On failure the cursor is restored so the caller can advance one byte and
/// retry, which reproduces scan-from-every-index matching.
fn try_parse_link(cur: &mut Cursor<'_>) -> Option<LinkOccurrence> {
    let saved = cur.clone();
    let start = cur.pos();

    // An escape marker directly before the opening bracket joins the match.
    if cur.starts_with(MarkdownLink::ESCAPED_OPEN) {
        cur.bump();
    }
    if cur.peek() != Some(MarkdownLink::OPEN) {
        *cur = saved;
        return None;
    }
    cur.bump(); // [

    // Display text runs to the nearest `](`. A `]` with no `(` after it
    // stays part of the display text. Links never span lines.
    let display_start = cur.pos();
    let display_end;
    loop {
        if cur.eof() || is_line_break(cur.peek()) {
            *cur = saved;
            return None;
        }
        if cur.starts_with(MarkdownLink::ESCAPED_DISPLAY_CLOSE) {
            display_end = cur.pos();
            cur.bump_n(2); // \]
            break;
        }
        if cur.starts_with(MarkdownLink::DISPLAY_CLOSE) {
            display_end = cur.pos();
            cur.bump(); // ]
            break;
        }
        cur.bump();
    }
    cur.bump(); // (

    // Target runs to the nearest `)`.
    let target_start = cur.pos();
    let target_end;
    loop {
        if cur.eof() || is_line_break(cur.peek()) {
            *cur = saved;
            return None;
        }
        if cur.starts_with(MarkdownLink::ESCAPED_TARGET_CLOSE) {
            target_end = cur.pos();
            cur.bump_n(2); // \)
            break;
        }
        if cur.peek() == Some(MarkdownLink::TARGET_CLOSE) {
            target_end = cur.pos();
            cur.bump(); // )
            break;
        }
        cur.bump();
    }
    let end = cur.pos();

    Some(LinkOccurrence {
        display_text: cur.s[display_start..display_end].to_string(),
        target: cur.s[target_start..target_end].to_string(),
        raw_span: cur.s[start..end].to_string(),
        span: Span { start, end },
    })
}

fn is_line_break(b: Option<u8>) -> bool {
    b == Some(b'\n') || b == Some(b'\r')
}
