//! # Mode controller
//!
//! ## Overview
//!
//! The [ModeController] switches the active view between two modes:
//!
//! - In [Mode::Normal], an [Interceptor] is installed, and every typed character is handled
//!   here instead of being inserted: digits build up the repeat count, characters in the
//!   [Keymap] run their command, and everything else is swallowed.
//! - In [Mode::Insert], the interceptor is disposed, and typed text goes to the host.
//!
//! While an interactive query is open, its prompt owns the keyboard, and typed text is left
//! alone in either mode.
//!
//! ## Example
//!
//! ```
//! use selkie::commands::Command;
//! use selkie::config::Config;
//! use selkie::controller::{KeyOwner, Mode, ModeController};
//! use selkie::host::{memory::MemoryEditor, CursorStyle, Document};
//!
//! let mut editor = MemoryEditor::new("hello world");
//! let mut ctl = ModeController::new(&Config::default()).unwrap();
//!
//! ctl.handle_editor_change(Some(&mut editor));
//! assert_eq!(ctl.mode(), Mode::Normal);
//! assert_eq!(editor.cursor_style(), CursorStyle::Block);
//!
//! // Unmapped characters are swallowed.
//! assert_eq!(ctl.type_text(&mut editor, "x").unwrap(), KeyOwner::Normal);
//! assert_eq!(editor.text(), "hello world");
//!
//! ctl.execute(&mut editor, Command::Insert).unwrap();
//! assert_eq!(ctl.mode(), Mode::Insert);
//! assert_eq!(ctl.type_text(&mut editor, "x").unwrap(), KeyOwner::Host);
//! ```
use tracing::{debug, trace};

use crate::commands::{self, Command};
use crate::config::Config;
use crate::errors::SelkieResult;
use crate::host::{CursorStyle, EditorHost, RevealAt};
use crate::keymap::Keymap;
use crate::query::{QueryKind, QuerySession, QueryStatus};
use crate::ring::Snapshot;
use crate::selection::{
    adjust_selection_range,
    collapse_end,
    collapse_start,
    compose,
    MoveDir1D,
};
use crate::store::Store;

/// Context key published to the host, true while in Normal mode.
pub const ENABLED_CONTEXT: &str = "selkie.enabled";

/// Context key published to the host once the controller has taken over a view.
pub const ACTIVATED_CONTEXT: &str = "selkie.activated";

/// The two editing modes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Typed characters run commands.
    #[default]
    Normal,

    /// Typed characters are inserted into the document.
    Insert,
}

/// Who should handle a piece of typed text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyOwner {
    /// The text was consumed by Normal mode.
    Normal,

    /// The host should insert the text as usual.
    Host,

    /// An interactive query's prompt is open, and receives the text.
    Query,

    /// Normal mode consumed the text up to this byte offset and then switched to Insert mode.
    /// The host should insert the rest.
    Handoff(usize),
}

/// The keystroke subscription held while in Normal mode.
///
/// Disposing an interceptor more than once has no further effect.
#[derive(Debug)]
pub struct Interceptor {
    installed: bool,
}

impl Interceptor {
    fn install() -> Self {
        trace!(target: "selkie.mode", "interceptor_installed");

        Interceptor { installed: true }
    }

    /// Whether this subscription is still receiving keystrokes.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Stop receiving keystrokes.
    pub fn dispose(&mut self) {
        if std::mem::take(&mut self.installed) {
            trace!(target: "selkie.mode", "interceptor_disposed");
        }
    }
}

impl Drop for Interceptor {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Drives mode switching, command execution and interactive queries for the active view.
#[derive(Debug)]
pub struct ModeController {
    mode: Mode,
    interceptor: Option<Interceptor>,
    query: Option<QuerySession>,
    keymap: Keymap,
    store: Store,
}

impl ModeController {
    /// Create a controller using `config` for its key map and shared state.
    pub fn new(config: &Config) -> SelkieResult<Self> {
        config.validate()?;

        let keymap = config.keymap()?;
        let store = Store::new(config);
        let mode = if config.enabled { Mode::Normal } else { Mode::Insert };

        Ok(Self::from_parts(mode, keymap, store))
    }

    /// Create a controller from an existing key map and store.
    pub fn from_parts(mode: Mode, keymap: Keymap, store: Store) -> Self {
        ModeController { mode, interceptor: None, query: None, keymap, store }
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether typed characters are currently being intercepted.
    pub fn is_intercepting(&self) -> bool {
        self.interceptor.as_ref().map(Interceptor::is_installed).unwrap_or(false)
    }

    /// Whether an interactive query is open.
    pub fn is_query_open(&self) -> bool {
        self.query.is_some()
    }

    /// The Normal mode key map.
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Mutable access to the Normal mode key map.
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// The state shared across views.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the state shared across views.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Re-apply the current mode after the host switched to another view.
    pub fn handle_editor_change<H: EditorHost + ?Sized>(&mut self, host: Option<&mut H>) {
        let Some(host) = host else {
            return;
        };

        host.set_context(ACTIVATED_CONTEXT, true);

        if let Some(session) = self.query.take() {
            debug!(target: "selkie.query", kind = ?session.kind(), "abandoned");
            session.hide(host);
        }

        match self.mode {
            Mode::Normal => self.escape(host),
            Mode::Insert => self.resume(host),
        }
    }

    /// Enter Normal mode.
    pub fn escape<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(mut old) = self.interceptor.replace(Interceptor::install()) {
            old.dispose();
        }

        self.mode = Mode::Normal;
        host.set_context(ENABLED_CONTEXT, true);
        host.set_cursor_style(CursorStyle::Block);

        debug!(target: "selkie.mode", mode = ?self.mode, "mode_changed");
    }

    /// Enter Insert mode.
    pub fn resume<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        self.deactivate();

        self.mode = Mode::Insert;
        host.set_context(ENABLED_CONTEXT, false);
        host.set_cursor_style(host.configured_cursor_style());

        debug!(target: "selkie.mode", mode = ?self.mode, "mode_changed");
    }

    /// Stop intercepting keystrokes. Calling this when nothing is installed does nothing.
    pub fn deactivate(&mut self) {
        if let Some(mut interceptor) = self.interceptor.take() {
            interceptor.dispose();
        }
    }

    /// Handle text typed into the active view.
    ///
    /// Multi-character input (for example, from an input method) is handled one character at a
    /// time. If a command switches to Insert mode, the remaining text is handed back to the host
    /// with [KeyOwner::Handoff]. If a command opens a query, the remaining text is dropped, since
    /// the prompt only receives what is typed into it.
    pub fn type_text<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> SelkieResult<KeyOwner> {
        if self.query.is_some() {
            return Ok(KeyOwner::Query);
        }

        if !self.is_intercepting() {
            return Ok(KeyOwner::Host);
        }

        let mut owner = KeyOwner::Normal;

        for (i, c) in text.char_indices() {
            if self.store.counter.push_char(c) {
                continue;
            }

            let Some(cmd) = self.keymap.get(c) else {
                trace!(target: "selkie.mode", key = %c, "swallowed");
                continue;
            };

            self.execute(host, cmd)?;

            if self.query.is_some() {
                break;
            }

            if !self.is_intercepting() {
                let rest = i + c.len_utf8();

                if rest < text.len() {
                    owner = KeyOwner::Handoff(rest);
                }

                break;
            }
        }

        host.show_count(self.store.counter.display());

        Ok(owner)
    }

    fn open_query<H: EditorHost + ?Sized>(&mut self, host: &mut H, kind: QueryKind) {
        if let Some(old) = self.query.take() {
            old.hide(host);
        }

        self.query = Some(QuerySession::open(host, kind));
    }

    /// Handle a change to the open query prompt's value.
    pub fn query_changed<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        value: &str,
    ) -> SelkieResult<()> {
        let Some(session) = self.query.as_mut() else {
            return Ok(());
        };

        let status = session.changed(host, value, &mut self.store.counter);
        host.show_count(self.store.counter.display());

        if let QueryStatus::Done = status? {
            if let Some(session) = self.query.take() {
                session.hide(host);
            }
        }

        Ok(())
    }

    /// Handle the user accepting the open query prompt.
    pub fn query_accept<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(mut session) = self.query.take() {
            session.accept(host);
            session.hide(host);
        }
    }

    /// Handle the open query prompt being hidden without being accepted.
    pub fn query_hide<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(session) = self.query.take() {
            session.hide(host);
        }
    }

    /// Run the command named `name`.
    pub fn execute_named<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
    ) -> SelkieResult<()> {
        let cmd = name.parse()?;

        self.execute(host, cmd)
    }

    /// Run a command against the active view.
    pub fn execute<H: EditorHost + ?Sized>(&mut self, host: &mut H, cmd: Command) -> SelkieResult<()> {
        debug!(target: "selkie.command", command = %cmd, count = self.store.counter.value(), "execute");

        let res = self.run(host, cmd);

        host.show_count(self.store.counter.display());

        res
    }

    fn run<H: EditorHost + ?Sized>(&mut self, host: &mut H, cmd: Command) -> SelkieResult<()> {
        use crate::host::builtin;

        if let Some((collapse, name)) = cmd.passthrough() {
            return Ok(commands::repeat_builtin(&mut self.store.counter, host, collapse, name)?);
        }

        if let Some(map) = commands::selection_map(&cmd) {
            commands::map_selections(host, map);
            return Ok(());
        }

        let Store { counter, ring, saved } = &mut self.store;

        match cmd {
            Command::Escape => self.escape(host),
            Command::Insert => {
                commands::map_selections(host, collapse_start);
                self.resume(host);
            },
            Command::InsertLineStart => {
                host.execute(builtin::CURSOR_HOME, None)?;
                self.resume(host);
            },
            Command::InsertLineAfter => {
                host.execute(builtin::INSERT_LINE_AFTER, None)?;
                self.resume(host);
            },
            Command::InsertLineBefore => {
                host.execute(builtin::INSERT_LINE_BEFORE, None)?;
                self.resume(host);
            },
            Command::Append => {
                commands::map_selections(host, collapse_end);
                self.resume(host);
            },
            Command::AppendLineEnd => {
                host.execute(builtin::CURSOR_LINE_END, None)?;
                self.resume(host);
            },
            Command::SelectionCutInsert => {
                commands::cut_selected(ring, host)?;
                commands::map_selections(host, collapse_start);
                self.resume(host);
            },
            Command::SelectionDeleteInsert => {
                commands::delete_selected(host)?;
                commands::map_selections(host, collapse_start);
                self.resume(host);
            },
            Command::ReplaceCharacter => self.open_query(host, QueryKind::Replace),

            Command::CutSelected => commands::cut_selected(ring, host)?,
            Command::CopySelected => commands::copy_selected(ring, host),
            Command::DeleteSelected => commands::delete_selected(host)?,
            Command::PasteBefore => {
                commands::paste_repeated(counter, ring, host, collapse_start)?;
            },
            Command::PasteAfter => {
                let map = compose([adjust_selection_range, collapse_end]);
                commands::paste_repeated(counter, ring, host, map)?;
            },
            Command::PasteOver => {
                commands::map_selections(host, adjust_selection_range);
                commands::paste(ring, host)?;
            },
            Command::PastePrev => commands::paste_rotated(counter, ring, host, MoveDir1D::Previous)?,
            Command::PasteNext => commands::paste_rotated(counter, ring, host, MoveDir1D::Next)?,

            Command::SaveSelections => saved.save(host.selections()),
            Command::RestoreSelections => {
                if let Some(selections) = saved.get() {
                    host.set_selections(selections.to_vec());
                }
            },

            Command::SelectBuffer => commands::select_buffer(host),
            Command::FindChar(dir, side, extend) => {
                self.open_query(host, QueryKind::FindChar { dir, side, extend });
            },
            Command::KeepMatchingSelections => self.open_query(host, QueryKind::Keep),
            Command::IgnoreMatchingSelections => self.open_query(host, QueryKind::Ignore),
            Command::ExpressionSelect => self.open_query(host, QueryKind::Select),
            Command::ExpressionSplit => self.open_query(host, QueryKind::Split),

            Command::ScrollCursorPageTop => commands::scroll(host, RevealAt::Top)?,
            Command::ScrollCursorPageCenter => commands::scroll(host, RevealAt::Center)?,
            Command::ScrollCursorPageBottom => commands::scroll(host, RevealAt::Bottom)?,

            Command::PushDigit(d) => counter.push_digit(d),
            Command::PopDigit => counter.pop_digit(),
            Command::ResetCount => counter.reset(),

            Command::Nop => {},

            // Covered by passthrough() and selection_map().
            Command::CancelSelection |
            Command::CursorLineSelect |
            Command::CursorLineExtend |
            Command::CursorLeft |
            Command::CursorLeftSelect |
            Command::CursorRight |
            Command::CursorRightSelect |
            Command::CursorUp |
            Command::CursorUpSelect |
            Command::CursorDown |
            Command::CursorDownSelect |
            Command::CursorWordStartLeftSelect |
            Command::CursorWordStartLeftExtend |
            Command::CursorWordStartRightSelect |
            Command::CursorWordStartRightExtend |
            Command::CursorWordEndRightSelect |
            Command::CursorWordEndRightExtend |
            Command::SmartExpand |
            Command::SmartShrink |
            Command::InsertCursorBelow |
            Command::InsertCursorAbove |
            Command::Undo |
            Command::Redo => {},
        }

        Ok(())
    }

    /// The most recent clipboard snapshot, if anything has been cut or copied.
    pub fn clipboard(&self) -> Option<&Snapshot> {
        self.store.ring.recent()
    }
}

impl Drop for ModeController {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryEditor;
    use crate::host::{Document, SelectionHost};
    use crate::selection::{CharSide, Position, Selection};

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    fn setup(text: &str) -> (ModeController, MemoryEditor) {
        let mut editor = MemoryEditor::new(text).with_configured_style(CursorStyle::LineThin);
        let mut ctl = ModeController::new(&Config::default()).unwrap();

        ctl.handle_editor_change(Some(&mut editor));

        (ctl, editor)
    }

    #[test]
    fn test_activate() {
        let (ctl, editor) = setup("abc");

        assert_eq!(ctl.mode(), Mode::Normal);
        assert!(ctl.is_intercepting());
        assert_eq!(editor.context(ENABLED_CONTEXT), Some(true));
        assert_eq!(editor.cursor_style(), CursorStyle::Block);
    }

    #[test]
    fn test_activate_disabled() {
        let mut config = Config::default();
        config.enabled = false;

        let mut editor = MemoryEditor::new("abc").with_configured_style(CursorStyle::Underline);
        let mut ctl = ModeController::new(&config).unwrap();
        ctl.handle_editor_change(Some(&mut editor));

        assert_eq!(ctl.mode(), Mode::Insert);
        assert!(!ctl.is_intercepting());
        assert_eq!(editor.context(ENABLED_CONTEXT), Some(false));
        assert_eq!(editor.cursor_style(), CursorStyle::Underline);

        ctl.handle_editor_change::<MemoryEditor>(None);
        assert_eq!(ctl.mode(), Mode::Insert);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.clipboard.capacity = Some(0);

        assert!(ModeController::new(&config).is_err());

        config.clipboard.capacity = Some(1);
        let mut editor = MemoryEditor::new("abc");
        let mut ctl = ModeController::new(&config).unwrap();
        ctl.handle_editor_change(Some(&mut editor));

        ctl.execute(&mut editor, Command::CutSelected).unwrap();
        assert_eq!(editor.text(), "bc");
        assert_eq!(ctl.clipboard(), Some(&vec!["a".to_string()]));

        ctl.execute(&mut editor, Command::PasteBefore).unwrap();
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn test_insert_collapses_to_start() {
        let (mut ctl, mut editor) = setup("hello world");
        editor.set_selections(vec![
            Selection::new(pos(0, 4), pos(0, 1)),
            Selection::new(pos(0, 6), pos(0, 9)),
        ]);

        ctl.execute(&mut editor, Command::Insert).unwrap();

        assert_eq!(ctl.mode(), Mode::Insert);
        assert!(!ctl.is_intercepting());
        assert_eq!(editor.selections(), vec![
            Selection::caret(pos(0, 1)),
            Selection::caret(pos(0, 6)),
        ]);
        assert_eq!(editor.cursor_style(), CursorStyle::LineThin);
        assert_eq!(editor.context(ENABLED_CONTEXT), Some(false));
    }

    #[test]
    fn test_escape_from_insert() {
        let (mut ctl, mut editor) = setup("abc");

        ctl.execute(&mut editor, Command::Append).unwrap();
        assert_eq!(ctl.mode(), Mode::Insert);

        ctl.execute(&mut editor, Command::Escape).unwrap();
        assert_eq!(ctl.mode(), Mode::Normal);
        assert_eq!(editor.cursor_style(), CursorStyle::Block);
        assert_eq!(editor.context(ENABLED_CONTEXT), Some(true));

        // Escaping again keeps a single interceptor.
        ctl.execute(&mut editor, Command::Escape).unwrap();
        assert!(ctl.is_intercepting());
    }

    #[test]
    fn test_append_collapses_to_end() {
        let (mut ctl, mut editor) = setup("hello");
        editor.set_selections(vec![Selection::new(pos(0, 3), pos(0, 1))]);

        ctl.execute(&mut editor, Command::Append).unwrap();
        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 3))]);
    }

    #[test]
    fn test_mode_entry_builtins() {
        let (mut ctl, mut editor) = setup("one\ntwo");
        editor.set_selections(vec![Selection::caret(pos(0, 1))]);

        ctl.execute(&mut editor, Command::InsertLineAfter).unwrap();
        assert_eq!(ctl.mode(), Mode::Insert);
        assert_eq!(editor.text(), "one\n\ntwo");
        assert_eq!(editor.selections(), vec![Selection::caret(pos(1, 0))]);

        ctl.escape(&mut editor);
        ctl.execute(&mut editor, Command::AppendLineEnd).unwrap();
        ctl.escape(&mut editor);
        ctl.execute(&mut editor, Command::InsertLineStart).unwrap();
        ctl.escape(&mut editor);
        ctl.execute(&mut editor, Command::InsertLineBefore).unwrap();

        assert_eq!(editor.dispatched_names(), vec![
            "editor.action.insertLineAfter",
            "cursorLineEnd",
            "cursorHome",
            "editor.action.insertLineBefore",
        ]);
        assert_eq!(ctl.mode(), Mode::Insert);
    }

    #[test]
    fn test_mode_entry_failure_stays_normal() {
        let (mut ctl, mut editor) = setup("abc");
        editor.fail_command("cursorHome");

        assert!(ctl.execute(&mut editor, Command::InsertLineStart).is_err());
        assert_eq!(ctl.mode(), Mode::Normal);
    }

    #[test]
    fn test_cut_insert() {
        let (mut ctl, mut editor) = setup("abc def");
        editor.set_selections(vec![Selection::new(pos(0, 4), pos(0, 7))]);

        ctl.execute(&mut editor, Command::SelectionCutInsert).unwrap();

        assert_eq!(editor.text(), "abc ");
        assert_eq!(ctl.clipboard(), Some(&vec!["def".to_string()]));
        assert_eq!(ctl.mode(), Mode::Insert);

        ctl.escape(&mut editor);
        editor.set_selections(vec![Selection::caret(pos(0, 0))]);
        ctl.execute(&mut editor, Command::SelectionDeleteInsert).unwrap();

        assert_eq!(editor.text(), "bc ");
        assert_eq!(ctl.store().ring.len(), 1);
        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 0))]);
    }

    #[test]
    fn test_type_text_normal() {
        let (mut ctl, mut editor) = setup("one two");
        editor.set_selections(vec![Selection::new(pos(0, 0), pos(0, 3))]);

        // Digits count, unmapped characters vanish.
        assert_eq!(ctl.type_text(&mut editor, "1x2").unwrap(), KeyOwner::Normal);
        assert_eq!(ctl.store().counter.value(), 12);
        assert_eq!(editor.shown_count(), Some(12));
        assert_eq!(editor.text(), "one two");

        // ';' collapses to the active end.
        ctl.type_text(&mut editor, ";").unwrap();
        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 3))]);

        // '%' selects the whole document.
        ctl.type_text(&mut editor, "%").unwrap();
        assert_eq!(editor.selected_texts(), vec!["one two"]);
    }

    #[test]
    fn test_type_text_insert() {
        let (mut ctl, mut editor) = setup("abc");
        ctl.execute(&mut editor, Command::Insert).unwrap();

        assert_eq!(ctl.type_text(&mut editor, "12;").unwrap(), KeyOwner::Host);
        assert_eq!(ctl.store().counter.value(), 0);
    }

    #[test]
    fn test_type_text_stops_after_mode_change() {
        let (mut ctl, mut editor) = setup("abc");
        ctl.keymap_mut().bind('i', Command::Insert).unwrap();

        assert_eq!(ctl.type_text(&mut editor, "i5").unwrap(), KeyOwner::Handoff(1));
        assert_eq!(ctl.mode(), Mode::Insert);
        assert_eq!(ctl.store().counter.value(), 0);
    }

    #[test]
    fn test_type_text_hands_off_rest() {
        let (mut ctl, mut editor) = setup("abc");
        ctl.keymap_mut().bind('i', Command::Insert).unwrap();

        let text = "éixy";
        let owner = ctl.type_text(&mut editor, text).unwrap();

        assert_eq!(owner, KeyOwner::Handoff(3));
        assert_eq!(&text[3..], "xy");
        assert_eq!(ctl.mode(), Mode::Insert);

        // Nothing left over means nothing to hand off.
        ctl.escape(&mut editor);
        assert_eq!(ctl.type_text(&mut editor, "xi").unwrap(), KeyOwner::Normal);
        assert_eq!(ctl.mode(), Mode::Insert);

        // Text after a query opens is dropped.
        ctl.escape(&mut editor);
        ctl.keymap_mut().bind('s', Command::ExpressionSelect).unwrap();
        assert_eq!(ctl.type_text(&mut editor, "sab").unwrap(), KeyOwner::Normal);
        assert!(ctl.is_query_open());
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn test_editor_change_cancels_query() {
        let (mut ctl, mut editor) = setup("foo bar baz");
        ctl.execute(&mut editor, Command::SelectBuffer).unwrap();
        let baseline = editor.selections();

        ctl.execute(&mut editor, Command::ExpressionSelect).unwrap();
        ctl.query_changed(&mut editor, "ba.").unwrap();
        assert_eq!(editor.selected_texts(), vec!["bar", "baz"]);

        ctl.handle_editor_change(Some(&mut editor));

        assert!(!ctl.is_query_open());
        assert_eq!(editor.input_prompt(), None);
        assert_eq!(editor.selections(), baseline);
        assert_eq!(ctl.type_text(&mut editor, "x").unwrap(), KeyOwner::Normal);

        // A late hide from the host changes nothing.
        ctl.query_hide(&mut editor);
        assert_eq!(editor.selections(), baseline);
    }

    #[test]
    fn test_editor_change_publishes_contexts() {
        let (_, editor) = setup("abc");

        assert_eq!(editor.context(ACTIVATED_CONTEXT), Some(true));
        assert_eq!(editor.context(ENABLED_CONTEXT), Some(true));
        assert!(crate::bindings::WHEN_NORMAL.contains(ACTIVATED_CONTEXT));
        assert!(crate::bindings::WHEN_NORMAL.contains(ENABLED_CONTEXT));
    }

    #[test]
    fn test_repeat_motion() {
        let (mut ctl, mut editor) = setup("abcdefghijklmnop");

        ctl.type_text(&mut editor, "12").unwrap();
        ctl.execute(&mut editor, Command::CursorRight).unwrap();

        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 12))]);
        assert_eq!(editor.dispatched().len(), 12);
        assert_eq!(ctl.store().counter.value(), 0);
        assert_eq!(editor.shown_count(), None);
    }

    #[test]
    fn test_failed_repeat_resets_count() {
        let (mut ctl, mut editor) = setup("abc");
        editor.fail_command("redo");

        ctl.execute(&mut editor, Command::PushDigit(4)).unwrap();
        assert_eq!(editor.shown_count(), Some(4));

        assert!(ctl.execute_named(&mut editor, "selkie.redo").is_err());
        assert_eq!(ctl.store().counter.value(), 0);
        assert_eq!(editor.shown_count(), None);
    }

    #[test]
    fn test_count_commands() {
        let (mut ctl, mut editor) = setup("abc");

        for name in ["selkie.push4", "selkie.push0", "selkie.push2"] {
            ctl.execute_named(&mut editor, name).unwrap();
        }
        assert_eq!(ctl.store().counter.value(), 402);

        ctl.execute(&mut editor, Command::PopDigit).unwrap();
        assert_eq!(editor.shown_count(), Some(40));

        ctl.execute(&mut editor, Command::ResetCount).unwrap();
        assert_eq!(editor.shown_count(), None);

        assert!(ctl.execute_named(&mut editor, "selkie.push10").is_err());
    }

    #[test]
    fn test_clipboard_commands() {
        let (mut ctl, mut editor) = setup("ab cd");
        editor.set_selections(vec![Selection::caret(pos(0, 0)), Selection::caret(pos(0, 3))]);

        ctl.execute(&mut editor, Command::CopySelected).unwrap();
        assert_eq!(ctl.clipboard(), Some(&vec!["a".to_string(), "c".to_string()]));

        ctl.execute(&mut editor, Command::PasteAfter).unwrap();
        assert_eq!(editor.text(), "aab ccd");

        editor.set_selections(vec![Selection::new(pos(0, 0), pos(0, 7))]);
        ctl.execute(&mut editor, Command::PasteOver).unwrap();
        assert_eq!(editor.text(), "a");
    }

    #[test]
    fn test_paste_prev_next() {
        let (mut ctl, mut editor) = setup("");

        for word in ["one", "two"] {
            ctl.store_mut().ring.push(vec![word.to_string()]);
        }

        ctl.execute(&mut editor, Command::PastePrev).unwrap();
        assert_eq!(editor.text(), "one");

        ctl.execute(&mut editor, Command::PasteNext).unwrap();
        assert_eq!(editor.text(), "onetwo");
    }

    #[test]
    fn test_save_restore() {
        let (mut ctl, mut editor) = setup("abc\ndef");
        let saved = vec![Selection::caret(pos(1, 1)), Selection::caret(pos(0, 2))];

        // Nothing saved yet.
        ctl.execute(&mut editor, Command::RestoreSelections).unwrap();
        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 0))]);

        editor.set_selections(saved.clone());
        ctl.execute(&mut editor, Command::SaveSelections).unwrap();
        ctl.execute(&mut editor, Command::SelectBuffer).unwrap();
        ctl.execute(&mut editor, Command::RestoreSelections).unwrap();

        assert_eq!(editor.selections(), saved);
    }

    #[test]
    fn test_line_select() {
        let (mut ctl, mut editor) = setup("abc\ndef\nghi");
        editor.set_selections(vec![Selection::caret(pos(0, 2))]);

        ctl.execute(&mut editor, Command::CursorLineSelect).unwrap();
        assert_eq!(editor.selected_texts(), vec!["abc\n"]);

        ctl.execute(&mut editor, Command::CursorLineExtend).unwrap();
        assert_eq!(editor.selected_texts(), vec!["abc\ndef\n"]);

        ctl.execute(&mut editor, Command::CancelSelection).unwrap();
        assert_eq!(editor.selections(), vec![Selection::caret(pos(2, 0))]);
    }

    #[test]
    fn test_query_owns_keys() {
        let (mut ctl, mut editor) = setup("a,b,,c");
        ctl.execute(&mut editor, Command::SelectBuffer).unwrap();
        ctl.execute(&mut editor, Command::ExpressionSplit).unwrap();

        assert!(ctl.is_query_open());
        assert_eq!(ctl.type_text(&mut editor, "3;").unwrap(), KeyOwner::Query);
        assert_eq!(ctl.store().counter.value(), 0);

        ctl.query_changed(&mut editor, ",").unwrap();
        ctl.query_accept(&mut editor);

        assert!(!ctl.is_query_open());
        assert_eq!(editor.selected_texts(), vec!["a", "b", "", "c"]);
        assert_eq!(editor.input_prompt(), None);
        assert_eq!(ctl.type_text(&mut editor, ";").unwrap(), KeyOwner::Normal);
    }

    #[test]
    fn test_query_cancel() {
        let (mut ctl, mut editor) = setup("foo bar baz");
        ctl.execute(&mut editor, Command::SelectBuffer).unwrap();
        let baseline = editor.selections();

        ctl.execute(&mut editor, Command::ExpressionSelect).unwrap();
        ctl.query_changed(&mut editor, "ba.").unwrap();
        assert_eq!(editor.selected_texts(), vec!["bar", "baz"]);

        ctl.query_hide(&mut editor);
        assert_eq!(editor.selections(), baseline);
        assert!(!ctl.is_query_open());
    }

    #[test]
    fn test_query_reopen_cancels_previous() {
        let (mut ctl, mut editor) = setup("foo bar");
        ctl.execute(&mut editor, Command::SelectBuffer).unwrap();
        let baseline = editor.selections();

        ctl.execute(&mut editor, Command::ExpressionSelect).unwrap();
        ctl.query_changed(&mut editor, "o").unwrap();
        ctl.execute(&mut editor, Command::KeepMatchingSelections).unwrap();

        assert_eq!(editor.selections(), baseline);
        assert_eq!(editor.input_prompt(), Some("keep matching"));
    }

    #[test]
    fn test_replace_character() {
        let (mut ctl, mut editor) = setup("abc");
        editor.set_selections(vec![Selection::caret(pos(0, 1))]);

        ctl.execute(&mut editor, Command::ReplaceCharacter).unwrap();
        ctl.query_changed(&mut editor, "Z").unwrap();

        assert_eq!(editor.text(), "aZc");
        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 1))]);
        assert!(!ctl.is_query_open());
        assert_eq!(editor.input_prompt(), None);
    }

    #[test]
    fn test_replace_rejected_keeps_query() {
        let (mut ctl, mut editor) = setup("abc");
        editor.reject_edits(true);

        ctl.execute(&mut editor, Command::ReplaceCharacter).unwrap();
        assert!(ctl.query_changed(&mut editor, "Z").is_err());
        assert!(ctl.is_query_open());

        ctl.query_hide(&mut editor);
        assert_eq!(editor.selections(), vec![Selection::caret(pos(0, 0))]);
    }

    #[test]
    fn test_find_char_with_count() {
        let (mut ctl, mut editor) = setup("x.y.z.w");

        ctl.type_text(&mut editor, "3").unwrap();
        ctl.execute(&mut editor, Command::FindChar(MoveDir1D::Next, CharSide::Before, false))
            .unwrap();
        assert_eq!(editor.shown_count(), Some(3));

        ctl.query_changed(&mut editor, ".").unwrap();

        // Landing before a match means the later repetitions find the same one.
        assert_eq!(editor.selections(), vec![Selection::new(pos(0, 1), pos(0, 1))]);
        assert_eq!(editor.shown_count(), None);
        assert!(!ctl.is_query_open());
    }

    #[test]
    fn test_scroll_and_passthrough() {
        let (mut ctl, mut editor) = setup("a\nb\nc");
        editor.set_selections(vec![Selection::caret(pos(1, 0))]);

        ctl.execute(&mut editor, Command::ScrollCursorPageCenter).unwrap();
        ctl.execute(&mut editor, Command::SmartExpand).unwrap();
        ctl.execute(&mut editor, Command::Undo).unwrap();

        assert_eq!(editor.dispatched_names(), vec![
            "revealLine",
            "editor.action.smartSelect.expand",
            "undo",
        ]);
    }

    #[test]
    fn test_deactivate_idempotent() {
        let (mut ctl, mut editor) = setup("abc");

        ctl.deactivate();
        ctl.deactivate();
        assert!(!ctl.is_intercepting());
        assert_eq!(ctl.type_text(&mut editor, "x").unwrap(), KeyOwner::Host);

        let mut interceptor = Interceptor::install();
        interceptor.dispose();
        interceptor.dispose();
        assert!(!interceptor.is_installed());
    }
}
