//! # Host editor capabilities
//!
//! ## Overview
//!
//! This crate doesn't own a text buffer, a screen or a command palette. Everything it needs from
//! the surrounding editor is described by the six capability traits in this module:
//!
//! - [Document]: reading text, mapping offsets and positions, and applying edits
//! - [SelectionHost]: reading and replacing the current selections
//! - [InputSurface]: showing a free-text prompt for interactive queries
//! - [CommandDispatch]: running the editor's own built-in commands
//! - [ContextPublish]: exposing the current mode and repeat count to the editor's UI
//! - [CursorStyleHost]: switching the cursor shape between modes
//!
//! Any type implementing all six is an [EditorHost]. The [memory] module contains an in-memory
//! implementation, which is useful for tests and for running commands headlessly.
use std::fmt;
use std::str::FromStr;

use crate::errors::HostResult;
use crate::selection::{Position, Selection};

pub mod memory;

/// Identifiers for the built-in host commands that this crate delegates to.
pub mod builtin {
    /// Move each cursor one character left.
    pub const CURSOR_LEFT: &str = "cursorLeft";
    /// Extend each selection one character left.
    pub const CURSOR_LEFT_SELECT: &str = "cursorLeftSelect";
    /// Move each cursor one character right.
    pub const CURSOR_RIGHT: &str = "cursorRight";
    /// Extend each selection one character right.
    pub const CURSOR_RIGHT_SELECT: &str = "cursorRightSelect";
    /// Move each cursor one line up.
    pub const CURSOR_UP: &str = "cursorUp";
    /// Extend each selection one line up.
    pub const CURSOR_UP_SELECT: &str = "cursorUpSelect";
    /// Move each cursor one line down.
    pub const CURSOR_DOWN: &str = "cursorDown";
    /// Extend each selection one line down.
    pub const CURSOR_DOWN_SELECT: &str = "cursorDownSelect";
    /// Select to the start of the previous word.
    pub const CURSOR_WORD_START_LEFT_SELECT: &str = "cursorWordStartLeftSelect";
    /// Select to the start of the next word.
    pub const CURSOR_WORD_START_RIGHT_SELECT: &str = "cursorWordStartRightSelect";
    /// Select to the end of the next word.
    pub const CURSOR_WORD_END_RIGHT_SELECT: &str = "cursorWordEndRightSelect";
    /// Move each cursor to the start of its line.
    pub const CURSOR_HOME: &str = "cursorHome";
    /// Move each cursor to the end of its line.
    pub const CURSOR_LINE_END: &str = "cursorLineEnd";
    /// Open a new line below each cursor.
    pub const INSERT_LINE_AFTER: &str = "editor.action.insertLineAfter";
    /// Open a new line above each cursor.
    pub const INSERT_LINE_BEFORE: &str = "editor.action.insertLineBefore";
    /// Grow each selection to the enclosing syntax node.
    pub const SMART_SELECT_EXPAND: &str = "editor.action.smartSelect.expand";
    /// Shrink each selection to the previous syntax node.
    pub const SMART_SELECT_SHRINK: &str = "editor.action.smartSelect.shrink";
    /// Add a cursor on the line below.
    pub const INSERT_CURSOR_BELOW: &str = "editor.action.insertCursorBelow";
    /// Add a cursor on the line above.
    pub const INSERT_CURSOR_ABOVE: &str = "editor.action.insertCursorAbove";
    /// Scroll a line into view.
    pub const REVEAL_LINE: &str = "revealLine";
    /// Undo the last change.
    pub const UNDO: &str = "undo";
    /// Redo the last undone change.
    pub const REDO: &str = "redo";
}

/// A single replacement of the text between two positions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edit {
    /// Start of the replaced range.
    pub start: Position,

    /// End of the replaced range.
    pub end: Position,

    /// Text to put in place of the range.
    pub text: String,
}

impl Edit {
    /// Replace the text covered by a selection.
    pub fn replace<T: Into<String>>(selection: &Selection, text: T) -> Self {
        Edit {
            start: selection.start(),
            end: selection.end(),
            text: text.into(),
        }
    }

    /// Delete the text covered by a selection.
    pub fn delete(selection: &Selection) -> Self {
        Edit::replace(selection, "")
    }

    /// Insert text at a position.
    pub fn insert<T: Into<String>>(pos: Position, text: T) -> Self {
        Edit { start: pos, end: pos, text: text.into() }
    }
}

/// Where [builtin::REVEAL_LINE] should place the revealed line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RevealAt {
    /// At the top of the viewport.
    Top,

    /// In the middle of the viewport.
    Center,

    /// At the bottom of the viewport.
    Bottom,
}

impl RevealAt {
    /// The name hosts use for this placement.
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealAt::Top => "top",
            RevealAt::Center => "center",
            RevealAt::Bottom => "bottom",
        }
    }
}

/// Arguments passed along with a built-in host command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DispatchArgs {
    /// Arguments for [builtin::REVEAL_LINE].
    RevealLine {
        /// The line to scroll to.
        line: usize,

        /// Where to place it.
        at: RevealAt,
    },
}

/// Cursor shapes that a host can render.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CursorStyle {
    /// A filled block, used in Normal mode.
    Block,

    /// An outlined block.
    BlockOutline,

    /// A vertical bar.
    #[default]
    Line,

    /// A thin vertical bar.
    LineThin,

    /// A horizontal bar.
    Underline,

    /// A thin horizontal bar.
    UnderlineThin,
}

impl CursorStyle {
    /// Interpret a cursor style setting, falling back to [CursorStyle::Line] for anything
    /// unrecognized.
    pub fn from_setting(setting: &str) -> Self {
        setting.parse().unwrap_or_default()
    }
}

impl FromStr for CursorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(CursorStyle::Block),
            "block-outline" => Ok(CursorStyle::BlockOutline),
            "line" => Ok(CursorStyle::Line),
            "line-thin" => Ok(CursorStyle::LineThin),
            "underline" => Ok(CursorStyle::Underline),
            "underline-thin" => Ok(CursorStyle::UnderlineThin),
            _ => Err(format!("unknown cursor style: {s}")),
        }
    }
}

impl fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorStyle::Block => "block",
            CursorStyle::BlockOutline => "block-outline",
            CursorStyle::Line => "line",
            CursorStyle::LineThin => "line-thin",
            CursorStyle::Underline => "underline",
            CursorStyle::UnderlineThin => "underline-thin",
        };

        write!(f, "{name}")
    }
}

impl From<CursorStyle> for crossterm::cursor::SetCursorStyle {
    fn from(style: CursorStyle) -> Self {
        use crossterm::cursor::SetCursorStyle::*;

        match style {
            CursorStyle::Block | CursorStyle::BlockOutline => SteadyBlock,
            CursorStyle::Line | CursorStyle::LineThin => SteadyBar,
            CursorStyle::Underline | CursorStyle::UnderlineThin => SteadyUnderScore,
        }
    }
}

/// Access to the text of the active document.
///
/// Offsets count characters from the start of the document. Positions past the end of a line or
/// of the document are clamped to the nearest valid position.
pub trait Document {
    /// The full text of the document.
    fn text(&self) -> String;

    /// The text between two positions.
    fn text_in(&self, start: Position, end: Position) -> String;

    /// Convert a position into a character offset.
    fn offset_at(&self, pos: Position) -> usize;

    /// Convert a character offset into a position.
    fn position_at(&self, offset: usize) -> Position;

    /// The number of lines in the document.
    fn line_count(&self) -> usize;

    /// Apply a batch of non-overlapping edits. Either all of them are applied, or none are.
    fn apply_edits(&mut self, edits: &[Edit]) -> HostResult<()>;

    /// The text covered by a selection.
    fn selected_text(&self, selection: &Selection) -> String {
        self.text_in(selection.start(), selection.end())
    }

    /// The position the document would clamp `pos` to.
    fn validate(&self, pos: Position) -> Position {
        self.position_at(self.offset_at(pos))
    }
}

/// Access to the selections of the active view.
pub trait SelectionHost {
    /// The current selections, in order.
    fn selections(&self) -> Vec<Selection>;

    /// Replace the current selections.
    fn set_selections(&mut self, selections: Vec<Selection>);

    /// The first and last lines currently on screen.
    fn visible_lines(&self) -> Option<(usize, usize)>;
}

/// A free-text prompt used by interactive queries.
///
/// The host reports what happens in the prompt back through
/// [ModeController::query_changed](crate::controller::ModeController::query_changed),
/// [ModeController::query_accept](crate::controller::ModeController::query_accept) and
/// [ModeController::query_hide](crate::controller::ModeController::query_hide).
pub trait InputSurface {
    /// Show the prompt and give it keyboard focus.
    fn open_input(&mut self, prompt: &str);

    /// Hide and dispose of the prompt.
    fn close_input(&mut self);
}

/// Access to the host's own commands.
pub trait CommandDispatch {
    /// Run the named built-in command, returning once it has finished.
    fn execute(&mut self, command: &str, args: Option<DispatchArgs>) -> HostResult<()>;
}

/// Values published to the host for conditional keybindings and status display.
pub trait ContextPublish {
    /// Set a boolean context key.
    fn set_context(&mut self, key: &str, value: bool);

    /// Show the pending repeat count, or hide it when `None`.
    fn show_count(&mut self, count: Option<usize>);
}

/// Control over how the cursor is drawn.
pub trait CursorStyleHost {
    /// Change the cursor shape in the active view.
    fn set_cursor_style(&mut self, style: CursorStyle);

    /// The shape the user has configured for normal text entry.
    fn configured_cursor_style(&self) -> CursorStyle;
}

/// A host editor that provides every capability.
pub trait EditorHost:
    Document + SelectionHost + InputSurface + CommandDispatch + ContextPublish + CursorStyleHost
{
}

impl<T> EditorHost for T where
    T: Document + SelectionHost + InputSurface + CommandDispatch + ContextPublish + CursorStyleHost
{
}
