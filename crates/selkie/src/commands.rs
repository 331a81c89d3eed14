//! # Commands
//!
//! ## Overview
//!
//! Every operation that can be bound to a key is named by a [Command], which has a stable string
//! identifier (for example, `selkie.pasteAfter`) used in keybinding tables and configuration.
//!
//! This module also contains the buffer-level building blocks that the
//! [ModeController](crate::controller::ModeController) uses when executing commands: cutting,
//! copying and pasting through the [ClipboardRing], delegating repeated motions to the host, and
//! scrolling around the current selections.
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::count::RepeatCounter;
use crate::errors::{HostResult, SelkieError};
use crate::host::{DispatchArgs, Edit, EditorHost, RevealAt};
use crate::ring::{snapshot_value, ClipboardRing, Snapshot};
use crate::selection::{
    adjust_selection_range,
    collapse_active,
    map_all,
    CharSide,
    MoveDir1D,
    Selection,
    SelectionMap,
};

const PUSH_DIGIT: [&str; 10] = [
    "selkie.push0",
    "selkie.push1",
    "selkie.push2",
    "selkie.push3",
    "selkie.push4",
    "selkie.push5",
    "selkie.push6",
    "selkie.push7",
    "selkie.push8",
    "selkie.push9",
];

/// A bindable operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Enter Normal mode.
    Escape,
    /// Collapse each selection to its start, and enter Insert mode.
    Insert,
    /// Move to the start of the line, and enter Insert mode.
    InsertLineStart,
    /// Open a new line below the cursor, and enter Insert mode.
    InsertLineAfter,
    /// Open a new line above the cursor, and enter Insert mode.
    InsertLineBefore,
    /// Collapse each selection to its end, and enter Insert mode.
    Append,
    /// Move to the end of the line, and enter Insert mode.
    AppendLineEnd,
    /// Cut the selections, and enter Insert mode.
    SelectionCutInsert,
    /// Delete the selections, and enter Insert mode.
    SelectionDeleteInsert,
    /// Prompt for text to replace each selected character with.
    ReplaceCharacter,

    /// Cut each selection into a new clipboard snapshot.
    CutSelected,
    /// Copy each selection into a new clipboard snapshot.
    CopySelected,
    /// Delete each selection without touching the clipboard.
    DeleteSelected,
    /// Paste before each selection.
    PasteBefore,
    /// Paste after each selection.
    PasteAfter,
    /// Paste over each selection.
    PasteOver,
    /// Rotate to an older snapshot, and paste it.
    PastePrev,
    /// Rotate to a newer snapshot, and paste it.
    PasteNext,

    /// Remember the current selections.
    SaveSelections,
    /// Go back to the remembered selections.
    RestoreSelections,

    /// Collapse each selection onto its active end.
    CancelSelection,
    /// Select the whole document.
    SelectBuffer,
    /// Move left.
    CursorLeft,
    /// Extend left.
    CursorLeftSelect,
    /// Move right.
    CursorRight,
    /// Extend right.
    CursorRightSelect,
    /// Move up.
    CursorUp,
    /// Extend up.
    CursorUpSelect,
    /// Move down.
    CursorDown,
    /// Extend down.
    CursorDownSelect,
    /// Select to the start of the previous word.
    CursorWordStartLeftSelect,
    /// Extend to the start of the previous word.
    CursorWordStartLeftExtend,
    /// Select to the start of the next word.
    CursorWordStartRightSelect,
    /// Extend to the start of the next word.
    CursorWordStartRightExtend,
    /// Select to the end of the next word.
    CursorWordEndRightSelect,
    /// Extend to the end of the next word.
    CursorWordEndRightExtend,
    /// Prompt for text to search for, and move to it.
    FindChar(MoveDir1D, CharSide, bool),
    /// Select the line containing each cursor.
    CursorLineSelect,
    /// Extend each selection to the start of the following line.
    CursorLineExtend,
    /// Grow each selection to the enclosing syntactic unit.
    SmartExpand,
    /// Shrink each selection to the enclosed syntactic unit.
    SmartShrink,
    /// Prompt for a pattern, and keep the selections matching it.
    KeepMatchingSelections,
    /// Prompt for a pattern, and drop the selections matching it.
    IgnoreMatchingSelections,
    /// Prompt for a pattern, and select its matches.
    ExpressionSelect,
    /// Prompt for a pattern, and split the selections around its matches.
    ExpressionSplit,

    /// Add a cursor on the line below.
    InsertCursorBelow,
    /// Add a cursor on the line above.
    InsertCursorAbove,

    /// Scroll the cursor line to the top of the view.
    ScrollCursorPageTop,
    /// Scroll the cursor line to the middle of the view.
    ScrollCursorPageCenter,
    /// Scroll the cursor line to the bottom of the view.
    ScrollCursorPageBottom,

    /// Append a digit to the repeat count.
    PushDigit(u8),
    /// Remove the last digit of the repeat count.
    PopDigit,
    /// Clear the repeat count.
    ResetCount,

    /// Undo the last change.
    Undo,
    /// Redo the last undone change.
    Redo,
    /// Do nothing.
    Nop,
}

impl Command {
    /// Every command, each listed once.
    pub fn all() -> Vec<Command> {
        use Command::*;

        let mut cmds = vec![
            Escape,
            Insert,
            InsertLineStart,
            InsertLineAfter,
            InsertLineBefore,
            Append,
            AppendLineEnd,
            SelectionCutInsert,
            SelectionDeleteInsert,
            ReplaceCharacter,
            CutSelected,
            CopySelected,
            DeleteSelected,
            PasteBefore,
            PasteAfter,
            PasteOver,
            PastePrev,
            PasteNext,
            SaveSelections,
            RestoreSelections,
            CancelSelection,
            SelectBuffer,
            CursorLeft,
            CursorLeftSelect,
            CursorRight,
            CursorRightSelect,
            CursorUp,
            CursorUpSelect,
            CursorDown,
            CursorDownSelect,
            CursorWordStartLeftSelect,
            CursorWordStartLeftExtend,
            CursorWordStartRightSelect,
            CursorWordStartRightExtend,
            CursorWordEndRightSelect,
            CursorWordEndRightExtend,
        ];

        for side in [CharSide::Before, CharSide::After] {
            for dir in [MoveDir1D::Next, MoveDir1D::Previous] {
                cmds.push(FindChar(dir, side, false));
                cmds.push(FindChar(dir, side, true));
            }
        }

        cmds.extend([
            CursorLineSelect,
            CursorLineExtend,
            SmartExpand,
            SmartShrink,
            KeepMatchingSelections,
            IgnoreMatchingSelections,
            ExpressionSelect,
            ExpressionSplit,
            InsertCursorBelow,
            InsertCursorAbove,
            ScrollCursorPageTop,
            ScrollCursorPageCenter,
            ScrollCursorPageBottom,
        ]);

        cmds.extend((0..10).map(PushDigit));
        cmds.extend([PopDigit, ResetCount, Undo, Redo, Nop]);

        return cmds;
    }

    /// The identifier used to refer to this command in bindings and configuration.
    pub fn name(&self) -> &'static str {
        use Command::*;

        match self {
            Escape => "selkie.escape",
            Insert => "selkie.insert",
            InsertLineStart => "selkie.insertLineStart",
            InsertLineAfter => "selkie.insertLineAfter",
            InsertLineBefore => "selkie.insertLineBefore",
            Append => "selkie.append",
            AppendLineEnd => "selkie.appendLineEnd",
            SelectionCutInsert => "selkie.selectionCutInsert",
            SelectionDeleteInsert => "selkie.selectionDeleteInsert",
            ReplaceCharacter => "selkie.replaceCharacter",
            CutSelected => "selkie.cutSelected",
            CopySelected => "selkie.copySelected",
            DeleteSelected => "selkie.deleteSelected",
            PasteBefore => "selkie.pasteBefore",
            PasteAfter => "selkie.pasteAfter",
            PasteOver => "selkie.pasteOver",
            PastePrev => "selkie.pastePrev",
            PasteNext => "selkie.pasteNext",
            SaveSelections => "selkie.saveSelections",
            RestoreSelections => "selkie.restoreSelections",
            CancelSelection => "selkie.cancelSelection",
            SelectBuffer => "selkie.selectBuffer",
            CursorLeft => "selkie.cursorLeft",
            CursorLeftSelect => "selkie.cursorLeftSelect",
            CursorRight => "selkie.cursorRight",
            CursorRightSelect => "selkie.cursorRightSelect",
            CursorUp => "selkie.cursorUp",
            CursorUpSelect => "selkie.cursorUpSelect",
            CursorDown => "selkie.cursorDown",
            CursorDownSelect => "selkie.cursorDownSelect",
            CursorWordStartLeftSelect => "selkie.cursorWordStartLeftSelect",
            CursorWordStartLeftExtend => "selkie.cursorWordStartLeftExtend",
            CursorWordStartRightSelect => "selkie.cursorWordStartRightSelect",
            CursorWordStartRightExtend => "selkie.cursorWordStartRightExtend",
            CursorWordEndRightSelect => "selkie.cursorWordEndRightSelect",
            CursorWordEndRightExtend => "selkie.cursorWordEndRightExtend",
            FindChar(dir, side, extend) => {
                match (side, dir, extend) {
                    (CharSide::Before, MoveDir1D::Next, false) => {
                        "selkie.cursorCharacterBeforeRightSelect"
                    },
                    (CharSide::Before, MoveDir1D::Next, true) => {
                        "selkie.cursorCharacterBeforeRightExtend"
                    },
                    (CharSide::After, MoveDir1D::Next, false) => {
                        "selkie.cursorCharacterAfterRightSelect"
                    },
                    (CharSide::After, MoveDir1D::Next, true) => {
                        "selkie.cursorCharacterAfterRightExtend"
                    },
                    (CharSide::Before, MoveDir1D::Previous, false) => {
                        "selkie.cursorCharacterBeforeLeftSelect"
                    },
                    (CharSide::Before, MoveDir1D::Previous, true) => {
                        "selkie.cursorCharacterBeforeLeftExtend"
                    },
                    (CharSide::After, MoveDir1D::Previous, false) => {
                        "selkie.cursorCharacterAfterLeftSelect"
                    },
                    (CharSide::After, MoveDir1D::Previous, true) => {
                        "selkie.cursorCharacterAfterLeftExtend"
                    },
                }
            },
            CursorLineSelect => "selkie.cursorLineSelect",
            CursorLineExtend => "selkie.cursorLineExtend",
            SmartExpand => "selkie.smartExpand",
            SmartShrink => "selkie.smartShrink",
            KeepMatchingSelections => "selkie.keepMatchingSelections",
            IgnoreMatchingSelections => "selkie.ignoreMatchingSelections",
            ExpressionSelect => "selkie.expressionSelect",
            ExpressionSplit => "selkie.expressionSplit",
            InsertCursorBelow => "selkie.insertCursorBelow",
            InsertCursorAbove => "selkie.insertCursorAbove",
            ScrollCursorPageTop => "selkie.scrollCursorPageTop",
            ScrollCursorPageCenter => "selkie.scrollCursorPageCenter",
            ScrollCursorPageBottom => "selkie.scrollCursorPageBottom",
            PushDigit(d) => PUSH_DIGIT[usize::from(*d % 10)],
            PopDigit => "selkie.popDigit",
            ResetCount => "selkie.resetCount",
            Undo => "selkie.undo",
            Redo => "selkie.redo",
            Nop => "selkie.nop",
        }
    }

    /// For commands that just run a host built-in (repeatedly), the built-in's name and whether
    /// selections are collapsed before each run.
    pub fn passthrough(&self) -> Option<(bool, &'static str)> {
        use crate::host::builtin::*;
        use Command::*;

        let pt = match self {
            CursorLeft => (true, CURSOR_LEFT),
            CursorLeftSelect => (false, CURSOR_LEFT_SELECT),
            CursorRight => (true, CURSOR_RIGHT),
            CursorRightSelect => (false, CURSOR_RIGHT_SELECT),
            CursorUp => (true, CURSOR_UP),
            CursorUpSelect => (false, CURSOR_UP_SELECT),
            CursorDown => (true, CURSOR_DOWN),
            CursorDownSelect => (false, CURSOR_DOWN_SELECT),
            CursorWordStartLeftSelect => (true, CURSOR_WORD_START_LEFT_SELECT),
            CursorWordStartLeftExtend => (false, CURSOR_WORD_START_LEFT_SELECT),
            CursorWordStartRightSelect => (true, CURSOR_WORD_START_RIGHT_SELECT),
            CursorWordStartRightExtend => (false, CURSOR_WORD_START_RIGHT_SELECT),
            CursorWordEndRightSelect => (true, CURSOR_WORD_END_RIGHT_SELECT),
            CursorWordEndRightExtend => (false, CURSOR_WORD_END_RIGHT_SELECT),
            SmartExpand => (false, SMART_SELECT_EXPAND),
            SmartShrink => (false, SMART_SELECT_SHRINK),
            InsertCursorBelow => (false, INSERT_CURSOR_BELOW),
            InsertCursorAbove => (false, INSERT_CURSOR_ABOVE),
            Undo => (false, UNDO),
            Redo => (false, REDO),
            _ => return None,
        };

        Some(pt)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Command {
    type Err = SelkieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::all()
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| SelkieError::UnknownCommand(s.to_string()))
    }
}

/// Apply `f` to every selection in `host`.
pub fn map_selections<H: EditorHost + ?Sized>(host: &mut H, f: impl Fn(Selection) -> Selection) {
    let selections = map_all(&host.selections(), f);
    host.set_selections(selections);
}

/// Replace the selections with a single selection spanning the whole document.
pub fn select_buffer<H: EditorHost + ?Sized>(host: &mut H) {
    let end = host.text().chars().count();
    let start = host.position_at(0);
    let end = host.position_at(end);

    host.set_selections(vec![Selection::new(start, end)]);
}

/// Delete the text of every selection, with carets deleting the character under them.
pub fn delete_selected<H: EditorHost + ?Sized>(host: &mut H) -> HostResult<()> {
    map_selections(host, adjust_selection_range);

    let edits = host.selections().iter().map(Edit::delete).collect::<Vec<_>>();

    host.apply_edits(&edits)
}

fn capture<H: EditorHost + ?Sized>(host: &H) -> Snapshot {
    host.selections().iter().map(|s| host.selected_text(s)).collect()
}

/// Push the text of every selection onto `ring`, and then delete it.
pub fn cut_selected<H>(ring: &mut ClipboardRing<Snapshot>, host: &mut H) -> HostResult<()>
where
    H: EditorHost + ?Sized,
{
    map_selections(host, adjust_selection_range);

    let snapshot = capture(host);
    debug!(target: "selkie.command", strings = snapshot.len(), "cut");
    ring.push(snapshot);

    delete_selected(host)
}

/// Push the text of every selection onto `ring`, leaving the selections as they were.
pub fn copy_selected<H>(ring: &mut ClipboardRing<Snapshot>, host: &mut H)
where
    H: EditorHost + ?Sized,
{
    let selections = host.selections();

    host.set_selections(map_all(&selections, adjust_selection_range));
    let snapshot = capture(host);
    host.set_selections(selections);

    debug!(target: "selkie.command", strings = snapshot.len(), "copy");
    ring.push(snapshot);
}

/// Replace each selection with the matching string from the most recent snapshot.
///
/// Nothing happens when the ring is empty.
pub fn paste<H>(ring: &ClipboardRing<Snapshot>, host: &mut H) -> HostResult<()>
where
    H: EditorHost + ?Sized,
{
    let Some(snapshot) = ring.recent() else {
        return Ok(());
    };

    let edits = host
        .selections()
        .iter()
        .enumerate()
        .filter_map(|(i, s)| snapshot_value(snapshot, i).map(|v| Edit::replace(s, v)))
        .collect::<Vec<_>>();

    if edits.is_empty() {
        return Ok(());
    }

    host.apply_edits(&edits)
}

/// Repeatedly move the selections with `map`, and then paste.
pub fn paste_repeated<H, F>(
    counter: &mut RepeatCounter,
    ring: &ClipboardRing<Snapshot>,
    host: &mut H,
    map: F,
) -> HostResult<()>
where
    H: EditorHost + ?Sized,
    F: Fn(Selection) -> Selection,
{
    counter.run(|| {
        map_selections(host, &map);
        paste(ring, host)
    })
}

/// Rotate the ring [RepeatCounter::repetitions] times in `dir`, and then paste.
pub fn paste_rotated<H>(
    counter: &mut RepeatCounter,
    ring: &mut ClipboardRing<Snapshot>,
    host: &mut H,
    dir: MoveDir1D,
) -> HostResult<()>
where
    H: EditorHost + ?Sized,
{
    counter.run(|| -> HostResult<()> {
        match dir {
            MoveDir1D::Previous => ring.prev(),
            MoveDir1D::Next => ring.next(),
        }

        Ok(())
    })?;

    paste(ring, host)
}

/// Run a host built-in [RepeatCounter::repetitions] times, optionally collapsing the selections
/// before each run.
pub fn repeat_builtin<H>(
    counter: &mut RepeatCounter,
    host: &mut H,
    collapse: bool,
    builtin: &str,
) -> HostResult<()>
where
    H: EditorHost + ?Sized,
{
    counter.run(|| {
        if collapse {
            map_selections(host, collapse_active);
        }

        host.execute(builtin, None)
    })
}

/// The selections whose active line is visible, or all of them if none are.
pub fn visible_selections<H: EditorHost + ?Sized>(host: &H) -> Vec<Selection> {
    let selections = host.selections();

    let Some((top, bottom)) = host.visible_lines() else {
        return selections;
    };

    let visible = selections
        .iter()
        .filter(|s| top <= s.active.line && s.active.line <= bottom)
        .copied()
        .collect::<Vec<_>>();

    if visible.is_empty() {
        selections
    } else {
        visible
    }
}

/// Scroll the view so that a selection's line sits at `at`.
///
/// Scrolling to the top or middle uses the first visible selection, and scrolling to the bottom
/// uses the last.
pub fn scroll<H: EditorHost + ?Sized>(host: &mut H, at: RevealAt) -> HostResult<()> {
    let visible = visible_selections(host);

    let target = match at {
        RevealAt::Top => visible.first().map(|s| s.start().line),
        RevealAt::Center => visible.first().map(|s| s.active.line),
        RevealAt::Bottom => visible.last().map(|s| s.start().line),
    };

    let Some(line) = target else {
        return Ok(());
    };

    let args = DispatchArgs::RevealLine { line, at };

    host.execute(crate::host::builtin::REVEAL_LINE, Some(args))
}

/// A [SelectionMap] for each command that only transforms selections.
pub fn selection_map(cmd: &Command) -> Option<SelectionMap> {
    let map: SelectionMap = match cmd {
        Command::CancelSelection => collapse_active,
        Command::CursorLineSelect => crate::selection::line_select,
        Command::CursorLineExtend => crate::selection::line_extend,
        _ => return None,
    };

    Some(map)
}
