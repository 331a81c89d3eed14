//! # Selection algebra
//!
//! ## Overview
//!
//! A [Selection] is an `(anchor, active)` pair of [Position] values. Every command in this crate
//! works on an ordered sequence of selections, and most of them are built from the small, pure
//! transforms in this module, mapped over each element of the sequence:
//!
//! ```
//! use selkie::selection::{adjust_selection_range, collapse_end, compose, Position, Selection};
//!
//! let caret = Selection::caret(Position::new(0, 4));
//! let after = compose([adjust_selection_range, collapse_end]);
//!
//! assert_eq!(after(caret), Selection::caret(Position::new(0, 5)));
//! ```
//!
//! The transforms never look at the document: columns and lines that run past the end of a line
//! or of the document are clamped by the host when the selections are applied.
use std::cmp::{max, min};

/// A location in a document, as a zero-based line and column.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position {
    /// The line containing this position.
    pub line: usize,

    /// The character column within [Position::line].
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub const fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// Shift this position by a number of lines and columns.
    pub fn translate(&self, lines: usize, columns: usize) -> Self {
        Position {
            line: self.line.saturating_add(lines),
            column: self.column.saturating_add(columns),
        }
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, column): (usize, usize)) -> Self {
        Position::new(line, column)
    }
}

/// A selected range of text, with a fixed `anchor` and a moving `active` end.
///
/// When both ends are the same position, the selection is a caret.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Selection {
    /// The end of the selection that stays put while extending.
    pub anchor: Position,

    /// The end of the selection that moves while extending.
    pub active: Position,
}

impl Selection {
    /// Create a new selection.
    pub const fn new(anchor: Position, active: Position) -> Self {
        Selection { anchor, active }
    }

    /// Create a zero-width selection at a position.
    pub const fn caret(pos: Position) -> Self {
        Selection { anchor: pos, active: pos }
    }

    /// The earlier of the two ends.
    pub fn start(&self) -> Position {
        min(self.anchor, self.active)
    }

    /// The later of the two ends.
    pub fn end(&self) -> Position {
        max(self.anchor, self.active)
    }

    /// Whether this selection covers no text.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// Whether the active end comes before the anchor.
    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }
}

impl From<(Position, Position)> for Selection {
    fn from((anchor, active): (Position, Position)) -> Self {
        Selection::new(anchor, active)
    }
}

/// A transform applied independently to each selection in a sequence.
pub type SelectionMap = fn(Selection) -> Selection;

/// Represent movement along a 1-dimensional line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveDir1D {
    /// Move backwards, or to a previous point.
    Previous,

    /// Move forwards, or to a following point.
    Next,
}

/// Which side of a located piece of text the cursor should land on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CharSide {
    /// Stop right before the found text.
    Before,

    /// Stop one character after the start of the found text.
    After,
}

/// Collapse a selection onto its active end.
pub fn collapse_active(selection: Selection) -> Selection {
    Selection::caret(selection.active)
}

/// Collapse a selection onto its earlier end.
pub fn collapse_start(selection: Selection) -> Selection {
    Selection::caret(selection.start())
}

/// Collapse a selection onto its later end.
pub fn collapse_end(selection: Selection) -> Selection {
    Selection::caret(selection.end())
}

/// Widen a caret so that it covers the character underneath it.
///
/// Character-wise operations (delete, cut, copy, replace) run this first so that a caret acts on
/// a single character. Non-empty selections are returned unchanged.
pub fn adjust_selection_range(selection: Selection) -> Selection {
    if selection.is_empty() {
        let start = selection.start();

        return Selection::new(start, selection.end().translate(0, 1));
    }

    return selection;
}

/// Replace a selection with the whole line containing its active end, including the line break.
pub fn line_select(selection: Selection) -> Selection {
    let line = selection.active.line;

    Selection::new(Position::new(line, 0), Position::new(line.saturating_add(1), 0))
}

/// Keep the anchor and move the active end to the start of the following line.
pub fn line_extend(selection: Selection) -> Selection {
    let line = selection.active.line.saturating_add(1);

    Selection::new(selection.anchor, Position::new(line, 0))
}

/// Chain transforms left-to-right, feeding each one's output into the next.
pub fn compose<const N: usize>(maps: [SelectionMap; N]) -> impl Fn(Selection) -> Selection {
    move |selection| maps.iter().fold(selection, |acc, f| f(acc))
}

/// Apply a transform to every selection in a sequence, preserving order.
pub fn map_all<F>(selections: &[Selection], f: F) -> Vec<Selection>
where
    F: Fn(Selection) -> Selection,
{
    selections.iter().copied().map(f).collect()
}

/// Convert a character index into `text` into a byte index.
///
/// Indices past the end of the text resolve to the text's length.
pub fn char_to_byte(text: &str, idx: usize) -> usize {
    text.char_indices().nth(idx).map(|(b, _)| b).unwrap_or(text.len())
}

/// Convert a byte index into `text` into a character index.
pub fn byte_to_char(text: &str, idx: usize) -> usize {
    text[..idx].chars().count()
}

/// Search `text` for `needle`, starting from the character offset `from`.
///
/// Searching in [MoveDir1D::Next] looks at the text from `from` onwards, including the character
/// at `from`. Searching in [MoveDir1D::Previous] finds the last occurrence that starts before
/// `from`. The returned offset is where the cursor should land, according to `side`.
pub fn find_char(
    text: &str,
    from: usize,
    needle: &str,
    dir: MoveDir1D,
    side: CharSide,
) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }

    let split = char_to_byte(text, from);

    let found = match dir {
        MoveDir1D::Next => {
            let idx = text[split..].find(needle)?;

            from + byte_to_char(&text[split..], idx)
        },
        MoveDir1D::Previous => {
            let idx = text[..split].rfind(needle)?;

            byte_to_char(text, idx)
        },
    };

    match side {
        CharSide::Before => Some(found),
        CharSide::After => Some(found + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn sel(al: usize, ac: usize, bl: usize, bc: usize) -> Selection {
        Selection::new(Position::new(al, ac), Position::new(bl, bc))
    }

    #[test]
    fn test_start_end() {
        let forward = sel(1, 2, 3, 4);
        let backward = sel(3, 4, 1, 2);

        assert_eq!(forward.start(), Position::new(1, 2));
        assert_eq!(forward.end(), Position::new(3, 4));
        assert_eq!(backward.start(), Position::new(1, 2));
        assert_eq!(backward.end(), Position::new(3, 4));
        assert!(!forward.is_reversed());
        assert!(backward.is_reversed());

        // Same line, ordering comes from the column.
        let s = sel(2, 9, 2, 1);
        assert_eq!(s.start(), Position::new(2, 1));
        assert_eq!(s.end(), Position::new(2, 9));
    }

    #[test]
    fn test_collapse() {
        let s = sel(4, 2, 1, 7);

        assert_eq!(collapse_active(s), Selection::caret(Position::new(1, 7)));
        assert_eq!(collapse_start(s), Selection::caret(Position::new(1, 7)));
        assert_eq!(collapse_end(s), Selection::caret(Position::new(4, 2)));

        let s = sel(1, 7, 4, 2);
        assert_eq!(collapse_active(s), Selection::caret(Position::new(4, 2)));
    }

    #[test]
    fn test_adjust_selection_range() {
        // Carets grow to cover one character.
        let caret = Selection::caret(Position::new(3, 5));
        assert_eq!(adjust_selection_range(caret), sel(3, 5, 3, 6));

        // Anything else stays put, including reversed selections.
        let s = sel(3, 9, 3, 5);
        assert_eq!(adjust_selection_range(s), s);
    }

    #[test]
    fn test_adjust_idempotent() {
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let a = Position::new(rng.gen_range(0..20), rng.gen_range(0..80));
            let b = Position::new(rng.gen_range(0..20), rng.gen_range(0..80));

            if a == b {
                continue;
            }

            let s = Selection::new(a, b);
            let once = adjust_selection_range(s);

            assert_eq!(adjust_selection_range(once), once);
        }
    }

    #[test]
    fn test_line_select_extend() {
        let s = sel(2, 3, 5, 8);

        assert_eq!(line_select(s), sel(5, 0, 6, 0));
        assert_eq!(line_extend(s), sel(2, 3, 6, 0));

        // Extending repeatedly keeps walking down.
        assert_eq!(line_extend(line_extend(s)), sel(2, 3, 7, 0));
    }

    #[test]
    fn test_compose() {
        let caret = Selection::caret(Position::new(0, 3));
        let f = compose([adjust_selection_range, collapse_end]);
        assert_eq!(f(caret), Selection::caret(Position::new(0, 4)));

        // Order matters: collapsing first and then adjusting leaves a one-wide range.
        let g = compose([collapse_end, adjust_selection_range]);
        assert_eq!(g(sel(0, 1, 0, 3)), sel(0, 3, 0, 4));

        // No transforms is the identity.
        let id = compose([]);
        assert_eq!(id(sel(0, 1, 0, 3)), sel(0, 1, 0, 3));
    }

    #[test]
    fn test_map_all_preserves_order() {
        let sels = vec![sel(5, 1, 5, 3), sel(0, 0, 0, 2), sel(2, 4, 1, 1)];
        let res = map_all(&sels, collapse_start);

        assert_eq!(res, vec![
            Selection::caret(Position::new(5, 1)),
            Selection::caret(Position::new(0, 0)),
            Selection::caret(Position::new(1, 1)),
        ]);
    }

    #[test]
    fn test_find_char_next() {
        let text = "hello, world";

        assert_eq!(find_char(text, 0, "o", MoveDir1D::Next, CharSide::Before), Some(4));
        assert_eq!(find_char(text, 0, "o", MoveDir1D::Next, CharSide::After), Some(5));
        assert_eq!(find_char(text, 5, "o", MoveDir1D::Next, CharSide::Before), Some(8));

        // The character underneath the cursor counts.
        assert_eq!(find_char(text, 4, "o", MoveDir1D::Next, CharSide::Before), Some(4));

        assert_eq!(find_char(text, 0, "z", MoveDir1D::Next, CharSide::Before), None);
        assert_eq!(find_char(text, 0, "", MoveDir1D::Next, CharSide::Before), None);
    }

    #[test]
    fn test_find_char_previous() {
        let text = "hello, world";

        assert_eq!(find_char(text, 12, "o", MoveDir1D::Previous, CharSide::Before), Some(8));
        assert_eq!(find_char(text, 12, "o", MoveDir1D::Previous, CharSide::After), Some(9));
        assert_eq!(find_char(text, 8, "o", MoveDir1D::Previous, CharSide::Before), Some(4));
        assert_eq!(find_char(text, 4, "o", MoveDir1D::Previous, CharSide::Before), None);
    }

    #[test]
    fn test_find_char_multibyte() {
        let text = "naïve café";

        assert_eq!(find_char(text, 0, "é", MoveDir1D::Next, CharSide::Before), Some(9));
        assert_eq!(find_char(text, 3, "v", MoveDir1D::Next, CharSide::Before), Some(3));
        assert_eq!(find_char(text, 10, "ï", MoveDir1D::Previous, CharSide::After), Some(3));
    }
}
