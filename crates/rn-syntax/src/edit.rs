//! Byte-range text edits.
//!
//! Rewrite passes describe their changes as [`TextEdit`]s against the text
//! a tree was parsed from. The engine applies a batch back to front so that
//! earlier offsets stay valid while later ones are rewritten.

use rn_core::Span;
use tree_sitter::{InputEdit, Point};

use crate::error::SyntaxError;

/// Replacement of one byte range.
///
/// # Examples
///
/// ```
/// use rn_core::Span;
/// use rn_syntax::TextEdit;
///
/// let edit = TextEdit::replace(Span::new(0, 3), "let");
/// assert!(!edit.is_insertion());
/// assert!(TextEdit::insert(5, "x").is_insertion());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    /// The bytes to replace.
    pub span: Span,
    /// The text to put in their place.
    pub replacement: String,
}

impl TextEdit {
    /// Replaces `span` with `replacement`.
    #[must_use]
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Inserts `text` at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::new(offset, offset), text)
    }

    /// Deletes `span`.
    #[must_use]
    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }

    /// Returns `true` for a zero-width edit.
    #[inline]
    #[must_use]
    pub const fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }
}

/// Sorts edits back to front and rejects overlaps and invalid ranges.
///
/// After this call, applying the edits in order never invalidates the
/// offsets of the edits still to come.
pub fn prepare_edits(text: &str, edits: &mut [TextEdit]) -> Result<(), SyntaxError> {
    for edit in edits.iter() {
        let Span { start, end } = edit.span;
        if start > end
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            return Err(SyntaxError::EditOutOfBounds {
                span: edit.span,
                len: text.len(),
            });
        }
    }

    edits.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then_with(|| b.span.end.cmp(&a.span.end))
    });

    for pair in edits.windows(2) {
        let (later, earlier) = (&pair[0], &pair[1]);
        if later.span.overlaps(&earlier.span) {
            return Err(SyntaxError::OverlappingEdits {
                first: earlier.span,
                second: later.span,
            });
        }
    }
    Ok(())
}

/// Applies one edit to `text` and returns the matching tree-sitter edit.
pub(crate) fn apply_one(text: &mut String, edit: &TextEdit) -> InputEdit {
    let start_position = point_at(text, edit.span.start);
    let old_end_position = point_at(text, edit.span.end);
    let new_end_position = advance(start_position, &edit.replacement);

    text.replace_range(edit.span.range(), &edit.replacement);

    InputEdit {
        start_byte: edit.span.start,
        old_end_byte: edit.span.end,
        new_end_byte: edit.span.start + edit.replacement.len(),
        start_position,
        old_end_position,
        new_end_position,
    }
}

/// Row/column (0-based, byte columns) of an offset.
fn point_at(text: &str, offset: usize) -> Point {
    let before = text.get(..offset).unwrap_or(text);
    let row = before.bytes().filter(|b| *b == b'\n').count();
    let column = before.rfind('\n').map_or(offset, |i| offset - i - 1);
    Point::new(row, column)
}

/// Position reached after writing `inserted` starting at `start`.
fn advance(start: Point, inserted: &str) -> Point {
    let newlines = inserted.bytes().filter(|b| *b == b'\n').count();
    match inserted.rfind('\n') {
        Some(last) => Point::new(start.row + newlines, inserted.len() - last - 1),
        None => Point::new(start.row, start.column + inserted.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_sorts_back_to_front() {
        let text = "abcdefgh";
        let mut edits = vec![
            TextEdit::replace(Span::new(0, 1), "A"),
            TextEdit::replace(Span::new(4, 6), "EF"),
            TextEdit::insert(2, "_"),
        ];
        prepare_edits(text, &mut edits).expect("valid edits");
        let starts: Vec<_> = edits.iter().map(|e| e.span.start).collect();
        assert_eq!(starts, vec![4, 2, 0]);
    }

    #[test]
    fn test_prepare_rejects_overlap() {
        let mut edits = vec![
            TextEdit::replace(Span::new(0, 4), "x"),
            TextEdit::replace(Span::new(3, 6), "y"),
        ];
        let err = prepare_edits("abcdefgh", &mut edits).expect_err("overlap");
        assert!(matches!(err, SyntaxError::OverlappingEdits { .. }));
    }

    #[test]
    fn test_prepare_rejects_out_of_bounds() {
        let mut edits = vec![TextEdit::replace(Span::new(2, 40), "x")];
        let err = prepare_edits("short", &mut edits).expect_err("bounds");
        assert!(matches!(err, SyntaxError::EditOutOfBounds { len: 5, .. }));

        // Splitting a multi-byte character is rejected too.
        let mut edits = vec![TextEdit::insert(1, "x")];
        assert!(prepare_edits("é", &mut edits).is_err());
    }

    #[test]
    fn test_insertion_before_replacement_at_same_start() {
        let mut text = "hello world".to_owned();
        let mut edits = vec![
            TextEdit::replace(Span::new(6, 11), "there"),
            TextEdit::insert(6, "over "),
        ];
        prepare_edits(&text, &mut edits).expect("valid edits");
        for edit in &edits {
            apply_one(&mut text, edit);
        }
        assert_eq!(text, "hello over there");
    }

    #[test]
    fn test_apply_one_positions() {
        let mut text = "a\nbc\nd".to_owned();
        let edit = TextEdit::replace(Span::new(3, 4), "x\nyz");
        let input = apply_one(&mut text, &edit);
        assert_eq!(text, "a\nbx\nyz\nd");
        assert_eq!(input.start_position, Point::new(1, 1));
        assert_eq!(input.old_end_position, Point::new(1, 2));
        assert_eq!(input.new_end_position, Point::new(2, 2));
        assert_eq!(input.new_end_byte, 7);
    }
}
