//! # Interactive queries
//!
//! ## Overview
//!
//! Several commands need a piece of free text from the user before they can do anything: a
//! replacement character, a regular expression to select or split on, or a pattern to filter the
//! selections with. All of them share the same protocol, implemented by [QuerySession]:
//!
//! 1. When the session opens, it remembers the current selections as its *baseline* and asks the
//!    host to show a prompt.
//! 2. Every time the prompt's value changes, the preview is recomputed from the baseline (never
//!    from the previous preview) and shown as the live selections.
//! 3. Accepting the prompt leaves the last preview in place.
//! 4. Hiding the prompt without accepting restores the baseline exactly.
//!
//! Patterns are untrusted: an expression that fails to compile simply matches nothing.
use bitflags::bitflags;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::count::RepeatCounter;
use crate::errors::HostResult;
use crate::host::{Document, Edit, EditorHost};
use crate::selection::{
    adjust_selection_range,
    byte_to_char,
    find_char,
    map_all,
    CharSide,
    MoveDir1D,
    Selection,
};

bitflags! {
    /// Flags that control how a query pattern is compiled and scanned.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct PatternFlags: u32 {
        /// No flags set.
        const NONE = 0b00000000;

        /// Find every match instead of only the first one.
        const GLOBAL = 0b00000001;

        /// Make `^` and `$` match at line boundaries.
        const MULTILINE = 0b00000010;
    }
}

/// A matched span, as character offsets into the searched text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Match {
    /// Offset of the first matched character.
    pub start: usize,

    /// Offset just past the last matched character.
    pub end: usize,
}

/// Compile a user-supplied pattern, returning `None` if it isn't a valid expression.
pub fn compile(pattern: &str, flags: PatternFlags) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .multi_line(flags.contains(PatternFlags::MULTILINE))
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            debug!(target: "selkie.query", pattern, error = %e, "pattern_invalid");
            None
        },
    }
}

/// Scan `text` for matches of `re`.
///
/// With [PatternFlags::GLOBAL], scanning restarts after each match until the end of the text.
/// Empty matches move the scan forward by one character so that it always terminates.
pub fn find_matches(text: &str, re: &Regex, flags: PatternFlags) -> Vec<Match> {
    let mut matches = vec![];
    let mut at = 0;

    while at <= text.len() {
        let Some(m) = re.find_at(text, at) else {
            break;
        };

        matches.push(Match {
            start: byte_to_char(text, m.start()),
            end: byte_to_char(text, m.end()),
        });

        if !flags.contains(PatternFlags::GLOBAL) {
            break;
        }

        at = if m.end() > m.start() {
            m.end()
        } else {
            match text[m.end()..].chars().next() {
                Some(c) => m.end() + c.len_utf8(),
                None => break,
            }
        };
    }

    return matches;
}

fn selection_matches<D>(doc: &D, selection: &Selection, re: &Regex) -> (usize, usize, Vec<Match>)
where
    D: Document + ?Sized,
{
    let start = doc.offset_at(selection.start());
    let end = doc.offset_at(selection.end());
    let text = doc.selected_text(selection);

    (start, end, find_matches(&text, re, PatternFlags::GLOBAL))
}

/// Replace each selection with one sub-selection per match of `pattern` inside it.
///
/// An empty pattern leaves the selections as they are.
pub fn select_preview<D>(doc: &D, baseline: &[Selection], pattern: &str) -> Vec<Selection>
where
    D: Document + ?Sized,
{
    if pattern.is_empty() {
        return baseline.to_vec();
    }

    let Some(re) = compile(pattern, PatternFlags::GLOBAL) else {
        return vec![];
    };

    baseline
        .iter()
        .flat_map(|selection| {
            let (offset, _, matches) = selection_matches(doc, selection, &re);

            matches.into_iter().map(move |m| (offset + m.start, offset + m.end))
        })
        .map(|(start, end)| Selection::new(doc.position_at(start), doc.position_at(end)))
        .collect()
}

/// Replace each selection with the spans between matches of `pattern` inside it.
///
/// The spans before the first match and after the last one are included, so a selection with
/// `n` matches becomes `n + 1` selections. An empty pattern leaves the selections as they are.
pub fn split_preview<D>(doc: &D, baseline: &[Selection], pattern: &str) -> Vec<Selection>
where
    D: Document + ?Sized,
{
    if pattern.is_empty() {
        return baseline.to_vec();
    }

    let re = compile(pattern, PatternFlags::GLOBAL);

    baseline
        .iter()
        .flat_map(|selection| {
            let (offset, end, matches) = match re {
                Some(ref re) => selection_matches(doc, selection, re),
                None => {
                    let start = doc.offset_at(selection.start());
                    (start, doc.offset_at(selection.end()), vec![])
                },
            };

            let starts = std::iter::once(offset).chain(matches.iter().map(|m| offset + m.end));
            let ends = matches.iter().map(|m| offset + m.start).chain(std::iter::once(end));

            starts.zip(ends).collect::<Vec<_>>()
        })
        .map(|(start, end)| Selection::new(doc.position_at(start), doc.position_at(end)))
        .collect()
}

/// Keep the selections whose text does (`keep = true`) or doesn't (`keep = false`) contain a
/// match for `pattern`.
///
/// An invalid pattern matches nothing.
pub fn filter_preview<D>(doc: &D, baseline: &[Selection], pattern: &str, keep: bool) -> Vec<Selection>
where
    D: Document + ?Sized,
{
    let re = compile(pattern, PatternFlags::MULTILINE);

    baseline
        .iter()
        .filter(|selection| {
            let found = match re {
                Some(ref re) => re.is_match(&doc.selected_text(selection)),
                None => false,
            };

            found == keep
        })
        .copied()
        .collect()
}

/// Move each selection's active end to the next or previous occurrence of `needle`.
///
/// Selections with no occurrence in that direction are left alone.
pub fn find_char_preview<D>(
    doc: &D,
    selections: &[Selection],
    needle: &str,
    dir: MoveDir1D,
    side: CharSide,
    extend: bool,
) -> Vec<Selection>
where
    D: Document + ?Sized,
{
    let text = doc.text();

    selections
        .iter()
        .map(|selection| {
            let from = doc.offset_at(selection.active);

            match find_char(&text, from, needle, dir, side) {
                Some(off) => {
                    let active = doc.position_at(off);
                    let anchor = if extend { selection.anchor } else { selection.active };

                    Selection::new(anchor, active)
                },
                None => *selection,
            }
        })
        .collect()
}

/// The different commands built on top of [QuerySession].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryKind {
    /// Replace each selection (a caret counts as one character) with the typed text.
    Replace,

    /// Select every match of a regular expression within each selection.
    Select,

    /// Split each selection around the matches of a regular expression.
    Split,

    /// Keep only the selections that match a regular expression.
    Keep,

    /// Drop the selections that match a regular expression.
    Ignore,

    /// Move to a typed character.
    FindChar {
        /// Which direction to search in.
        dir: MoveDir1D,

        /// Which side of the found character to land on.
        side: CharSide,

        /// Whether to keep the anchor, or start a new selection from the active end.
        extend: bool,
    },
}

impl QueryKind {
    /// The prompt shown to the user.
    pub fn prompt(&self) -> &'static str {
        match self {
            QueryKind::Replace => "replace with",
            QueryKind::Select => "select",
            QueryKind::Split => "split",
            QueryKind::Keep => "keep matching",
            QueryKind::Ignore => "ignore matching",
            QueryKind::FindChar { .. } => "find",
        }
    }

    /// Whether the first non-empty value finishes the query.
    pub fn is_single_shot(&self) -> bool {
        matches!(self, QueryKind::Replace | QueryKind::FindChar { .. })
    }
}

/// Whether a query session is still waiting for input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryStatus {
    /// The prompt is still open.
    Open,

    /// The session has committed its effect, and the prompt should be closed.
    Done,
}

/// A single run of an interactive query.
#[derive(Clone, Debug)]
pub struct QuerySession {
    kind: QueryKind,
    baseline: Vec<Selection>,
    shown: Vec<Selection>,
    value: String,
    committed: bool,
}

impl QuerySession {
    /// Start a session on the current selections of `host`, and open the host's prompt.
    pub fn open<H: EditorHost + ?Sized>(host: &mut H, kind: QueryKind) -> Self {
        let baseline = host.selections();

        if let QueryKind::Replace = kind {
            host.set_selections(map_all(&baseline, adjust_selection_range));
        }

        host.open_input(kind.prompt());

        debug!(target: "selkie.query", ?kind, selections = baseline.len(), "open");

        QuerySession {
            kind,
            shown: baseline.clone(),
            baseline,
            value: String::new(),
            committed: false,
        }
    }

    /// What this session is for.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// The selections from before the session opened.
    pub fn baseline(&self) -> &[Selection] {
        &self.baseline
    }

    /// The latest value typed into the prompt.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the session has been accepted.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Handle a change to the prompt's value.
    ///
    /// Single-shot queries use `counter` to decide how many times to run, and commit as soon as
    /// they receive a non-empty value.
    pub fn changed<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        value: &str,
        counter: &mut RepeatCounter,
    ) -> HostResult<QueryStatus> {
        self.value = value.to_string();

        if self.committed {
            return Ok(QueryStatus::Done);
        }

        match self.kind {
            QueryKind::Replace => {
                if value.is_empty() {
                    return Ok(QueryStatus::Open);
                }

                let edits = host
                    .selections()
                    .iter()
                    .map(|s| Edit::replace(s, value))
                    .collect::<Vec<_>>();

                host.apply_edits(&edits)?;
                host.set_selections(self.baseline.clone());
                self.committed = true;

                return Ok(QueryStatus::Done);
            },
            QueryKind::FindChar { dir, side, extend } => {
                if value.is_empty() {
                    return Ok(QueryStatus::Open);
                }

                self.committed = true;

                counter.run(|| -> HostResult<()> {
                    let current = host.selections();
                    let moved = find_char_preview(&*host, &current, value, dir, side, extend);
                    host.set_selections(moved);

                    Ok(())
                })?;

                return Ok(QueryStatus::Done);
            },
            QueryKind::Select => {
                let mut preview = select_preview(&*host, &self.baseline, value);

                if preview.is_empty() {
                    preview = self.baseline.clone();
                }

                self.show(host, preview);
            },
            QueryKind::Split => {
                let preview = split_preview(&*host, &self.baseline, value);
                self.show(host, preview);
            },
            QueryKind::Keep | QueryKind::Ignore => {
                let keep = matches!(self.kind, QueryKind::Keep);
                let preview = filter_preview(&*host, &self.baseline, value, keep);

                if !preview.is_empty() {
                    self.show(host, preview);
                }
            },
        }

        Ok(QueryStatus::Open)
    }

    fn show<H: EditorHost + ?Sized>(&mut self, host: &mut H, preview: Vec<Selection>) {
        if preview.is_empty() {
            return;
        }

        debug!(target: "selkie.query", kind = ?self.kind, selections = preview.len(), "preview");

        self.shown = preview.clone();
        host.set_selections(preview);
    }

    /// Accept the current preview and close the prompt.
    pub fn accept<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        self.committed = true;
        host.close_input();

        debug!(target: "selkie.query", kind = ?self.kind, selections = self.shown.len(), "accept");
    }

    /// Finish the session after the prompt was hidden, restoring the baseline unless it was
    /// accepted.
    pub fn hide<H: EditorHost + ?Sized>(self, host: &mut H) {
        if !self.committed {
            debug!(target: "selkie.query", kind = ?self.kind, "cancel");
            host.set_selections(self.baseline);
        }

        host.close_input();
    }
}
