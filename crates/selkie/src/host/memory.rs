//! # In-memory host
//!
//! ## Overview
//!
//! [MemoryEditor] implements every [EditorHost](super::EditorHost) capability on top of a
//! [Rope]. Positions are validated the way graphical editors usually do it: lines past the end
//! of the document clamp to the end of the document, and columns past the end of a line clamp to
//! the end of that line. After each batch of edits, selections are carried along with the text
//! around them.
//!
//! A handful of built-in motions are implemented so that repeated commands have a visible effect;
//! every dispatched command is also recorded for inspection.
//!
//! ```
//! use selkie::host::{memory::MemoryEditor, Document, SelectionHost};
//! use selkie::selection::{Position, Selection};
//!
//! let mut editor = MemoryEditor::new("hello\nworld\n");
//! editor.set_selections(vec![Selection::caret(Position::new(1, 99))]);
//!
//! assert_eq!(editor.selections(), vec![Selection::caret(Position::new(1, 5))]);
//! assert_eq!(editor.offset_at(Position::new(1, 5)), 11);
//! ```
use std::collections::{HashMap, HashSet};

use ropey::Rope;
use tracing::trace;

use super::{
    builtin,
    CommandDispatch,
    ContextPublish,
    CursorStyle,
    CursorStyleHost,
    DispatchArgs,
    Document,
    Edit,
    InputSurface,
    SelectionHost,
};
use crate::errors::{HostError, HostResult};
use crate::selection::{Position, Selection};

/// A text editor that lives entirely in memory.
#[derive(Clone, Debug)]
pub struct MemoryEditor {
    rope: Rope,
    selections: Vec<Selection>,
    visible: Option<(usize, usize)>,

    input: Option<String>,
    contexts: HashMap<String, bool>,
    count: Option<usize>,

    cursor_style: CursorStyle,
    configured_style: CursorStyle,

    dispatched: Vec<(String, Option<DispatchArgs>)>,
    failing: HashSet<String>,
    reject_edits: bool,
}

impl MemoryEditor {
    /// Create a new editor containing `text`, with a single caret at the start.
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let last = rope.len_lines().saturating_sub(1);

        MemoryEditor {
            rope,
            selections: vec![Selection::default()],
            visible: Some((0, last)),

            input: None,
            contexts: HashMap::new(),
            count: None,

            cursor_style: CursorStyle::default(),
            configured_style: CursorStyle::default(),

            dispatched: vec![],
            failing: HashSet::new(),
            reject_edits: false,
        }
    }

    /// Set the cursor style the user has configured.
    pub fn with_configured_style(mut self, style: CursorStyle) -> Self {
        self.configured_style = style;
        self
    }

    /// Change which lines are reported as visible.
    pub fn set_visible_lines(&mut self, visible: Option<(usize, usize)>) {
        self.visible = visible;
    }

    /// Make the named built-in command fail whenever it is dispatched.
    pub fn fail_command(&mut self, command: &str) {
        self.failing.insert(command.to_string());
    }

    /// Make every future batch of edits fail.
    pub fn reject_edits(&mut self, reject: bool) {
        self.reject_edits = reject;
    }

    /// The currently displayed cursor style.
    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }

    /// The value last published for a context key.
    pub fn context(&self, key: &str) -> Option<bool> {
        self.contexts.get(key).copied()
    }

    /// The repeat count currently being shown.
    pub fn shown_count(&self) -> Option<usize> {
        self.count
    }

    /// The prompt of the open input surface, if one is open.
    pub fn input_prompt(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Every built-in command dispatched so far, in order.
    pub fn dispatched(&self) -> &[(String, Option<DispatchArgs>)] {
        &self.dispatched
    }

    /// The names of the built-in commands dispatched so far, in order.
    pub fn dispatched_names(&self) -> Vec<&str> {
        self.dispatched.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The selected text of every selection, in order.
    pub fn selected_texts(&self) -> Vec<String> {
        self.selections.iter().map(|s| self.selected_text(s)).collect()
    }

    /// Number of characters on `line`, not counting its line break.
    fn line_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();

        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;

            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }

        len
    }

    fn last_line(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }

    fn end_position(&self) -> Position {
        let last = self.last_line();

        Position::new(last, self.line_len(last))
    }

    fn clamp(&self, pos: Position) -> Position {
        if pos.line > self.last_line() {
            return self.end_position();
        }

        Position::new(pos.line, pos.column.min(self.line_len(pos.line)))
    }

    fn clamp_selection(&self, s: Selection) -> Selection {
        Selection::new(self.clamp(s.anchor), self.clamp(s.active))
    }

    fn move_each<F>(&mut self, extend: bool, f: F)
    where
        F: Fn(&Self, Position) -> Position,
    {
        let moved = self
            .selections
            .iter()
            .map(|s| {
                let active = self.clamp(f(self, s.active));

                if extend {
                    Selection::new(s.anchor, active)
                } else {
                    Selection::caret(active)
                }
            })
            .collect();

        self.selections = moved;
    }

    fn step_offset(&self, pos: Position, forward: bool) -> Position {
        let off = self.offset_at(pos);
        let off = if forward {
            (off + 1).min(self.rope.len_chars())
        } else {
            off.saturating_sub(1)
        };

        self.position_at(off)
    }

    fn open_line(&mut self, below: bool) -> HostResult<()> {
        let carets = self
            .selections
            .iter()
            .map(|s| {
                let line = s.active.line;

                if below {
                    Selection::caret(Position::new(line, self.line_len(line)))
                } else {
                    Selection::caret(Position::new(line, 0))
                }
            })
            .collect::<Vec<_>>();

        let edits = carets.iter().map(|s| Edit::insert(s.active, "\n")).collect::<Vec<_>>();

        self.selections = carets;
        self.apply_edits(&edits)?;

        if !below {
            // Carets were pushed past the inserted break; step back onto the new line.
            let moved = self
                .selections
                .iter()
                .map(|s| {
                    let off = self.offset_at(s.active).saturating_sub(1);
                    Selection::caret(self.position_at(off))
                })
                .collect();

            self.selections = moved;
        }

        Ok(())
    }

    fn add_cursor(&mut self, below: bool) {
        let extra = if below {
            self.selections
                .iter()
                .max_by_key(|s| s.active)
                .map(|s| s.active.translate(1, 0))
                .filter(|p| p.line <= self.last_line())
        } else {
            self.selections
                .iter()
                .min_by_key(|s| s.active)
                .and_then(|s| s.active.line.checked_sub(1).map(|l| Position::new(l, s.active.column)))
        };

        if let Some(pos) = extra {
            let caret = Selection::caret(self.clamp(pos));

            if below {
                self.selections.push(caret);
            } else {
                self.selections.insert(0, caret);
            }
        }
    }
}

/// Map an offset through a sorted list of `(start, end, inserted_len)` replacements.
fn map_offset(offset: usize, edits: &[(usize, usize, usize)]) -> usize {
    let mut shift: isize = 0;

    for &(start, end, len) in edits {
        if offset < start {
            break;
        }

        if offset > end {
            shift += len as isize - (end - start) as isize;
            continue;
        }

        return (start as isize + shift) as usize + len;
    }

    (offset as isize + shift) as usize
}

impl Document for MemoryEditor {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn text_in(&self, start: Position, end: Position) -> String {
        let a = self.offset_at(start);
        let b = self.offset_at(end);
        let (a, b) = if a <= b { (a, b) } else { (b, a) };

        self.rope.slice(a..b).to_string()
    }

    fn offset_at(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);

        self.rope.line_to_char(pos.line) + pos.column
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);

        self.clamp(Position::new(line, offset - self.rope.line_to_char(line)))
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn apply_edits(&mut self, edits: &[Edit]) -> HostResult<()> {
        if self.reject_edits {
            return Err(HostError::EditRejected("document is read-only".into()));
        }

        let mut ranges = edits
            .iter()
            .map(|e| {
                let a = self.offset_at(e.start);
                let b = self.offset_at(e.end);

                (a.min(b), a.max(b), e.text.as_str())
            })
            .collect::<Vec<_>>();

        ranges.sort_by_key(|&(start, end, _)| (start, end));

        for pair in ranges.windows(2) {
            if pair[0].1 > pair[1].0 {
                let (a, b) = (pair[0], pair[1]);
                let msg = format!("overlapping ranges {}..{} and {}..{}", a.0, a.1, b.0, b.1);

                return Err(HostError::EditRejected(msg));
            }
        }

        let anchors = self
            .selections
            .iter()
            .map(|s| (self.offset_at(s.anchor), self.offset_at(s.active)))
            .collect::<Vec<_>>();

        for &(start, end, text) in ranges.iter().rev() {
            self.rope.remove(start..end);
            self.rope.insert(start, text);
        }

        let shifts = ranges
            .iter()
            .map(|&(start, end, text)| (start, end, text.chars().count()))
            .collect::<Vec<_>>();

        self.selections = anchors
            .into_iter()
            .map(|(anchor, active)| {
                let anchor = self.position_at(map_offset(anchor, &shifts));
                let active = self.position_at(map_offset(active, &shifts));

                Selection::new(anchor, active)
            })
            .collect();

        trace!(target: "selkie.memory", edits = ranges.len(), len = self.rope.len_chars(), "apply_edits");

        Ok(())
    }
}

impl SelectionHost for MemoryEditor {
    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        if selections.is_empty() {
            return;
        }

        let mut merged: Vec<Selection> = Vec::with_capacity(selections.len());

        // Identical selections collapse into one.
        for sel in selections.into_iter().map(|s| self.clamp_selection(s)) {
            if !merged.contains(&sel) {
                merged.push(sel);
            }
        }

        self.selections = merged;
    }

    fn visible_lines(&self) -> Option<(usize, usize)> {
        self.visible
    }
}

impl InputSurface for MemoryEditor {
    fn open_input(&mut self, prompt: &str) {
        self.input = Some(prompt.to_string());
    }

    fn close_input(&mut self) {
        self.input = None;
    }
}

impl CommandDispatch for MemoryEditor {
    fn execute(&mut self, command: &str, args: Option<DispatchArgs>) -> HostResult<()> {
        self.dispatched.push((command.to_string(), args));

        if self.failing.contains(command) {
            return Err(HostError::CommandFailed(command.to_string(), "injected failure".into()));
        }

        match command {
            builtin::CURSOR_LEFT => self.move_each(false, |e, p| e.step_offset(p, false)),
            builtin::CURSOR_LEFT_SELECT => self.move_each(true, |e, p| e.step_offset(p, false)),
            builtin::CURSOR_RIGHT => self.move_each(false, |e, p| e.step_offset(p, true)),
            builtin::CURSOR_RIGHT_SELECT => self.move_each(true, |e, p| e.step_offset(p, true)),
            builtin::CURSOR_UP => {
                self.move_each(false, |_, p| Position::new(p.line.saturating_sub(1), p.column))
            },
            builtin::CURSOR_UP_SELECT => {
                self.move_each(true, |_, p| Position::new(p.line.saturating_sub(1), p.column))
            },
            builtin::CURSOR_DOWN => {
                let last = self.last_line();
                self.move_each(false, |_, p| Position::new((p.line + 1).min(last), p.column))
            },
            builtin::CURSOR_DOWN_SELECT => {
                let last = self.last_line();
                self.move_each(true, |_, p| Position::new((p.line + 1).min(last), p.column))
            },
            builtin::CURSOR_HOME => self.move_each(false, |_, p| Position::new(p.line, 0)),
            builtin::CURSOR_LINE_END => {
                self.move_each(false, |e, p| Position::new(p.line, e.line_len(p.line)))
            },
            builtin::INSERT_LINE_AFTER => self.open_line(true)?,
            builtin::INSERT_LINE_BEFORE => self.open_line(false)?,
            builtin::INSERT_CURSOR_BELOW => self.add_cursor(true),
            builtin::INSERT_CURSOR_ABOVE => self.add_cursor(false),
            builtin::CURSOR_WORD_START_LEFT_SELECT |
            builtin::CURSOR_WORD_START_RIGHT_SELECT |
            builtin::CURSOR_WORD_END_RIGHT_SELECT |
            builtin::SMART_SELECT_EXPAND |
            builtin::SMART_SELECT_SHRINK |
            builtin::REVEAL_LINE |
            builtin::UNDO |
            builtin::REDO => {
                // Only recorded.
            },
            _ => return Err(HostError::UnknownCommand(command.to_string())),
        }

        Ok(())
    }
}

impl ContextPublish for MemoryEditor {
    fn set_context(&mut self, key: &str, value: bool) {
        self.contexts.insert(key.to_string(), value);
    }

    fn show_count(&mut self, count: Option<usize>) {
        self.count = count;
    }
}

impl CursorStyleHost for MemoryEditor {
    fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    fn configured_cursor_style(&self) -> CursorStyle {
        self.configured_style
    }
}
