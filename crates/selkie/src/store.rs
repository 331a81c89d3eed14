//! # Shared command state
//!
//! ## Overview
//!
//! The repeat count, the clipboard ring and the saved selections outlive any single editor view.
//! They are grouped into a [Store], which is created once at startup and handed to the
//! [ModeController](crate::controller::ModeController).
use crate::config::Config;
use crate::count::RepeatCounter;
use crate::ring::{ClipboardRing, Snapshot};
use crate::selection::Selection;

/// The most recently saved selection sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SavedSelections {
    selections: Vec<Selection>,
}

impl SavedSelections {
    /// Replace whatever was saved before.
    pub fn save(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
    }

    /// The saved selections, if there are any.
    pub fn get(&self) -> Option<&[Selection]> {
        if self.selections.is_empty() {
            None
        } else {
            Some(self.selections.as_slice())
        }
    }
}

/// State shared by every editor view.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// The count typed before the next command.
    pub counter: RepeatCounter,

    /// Snapshots captured by cut and copy.
    pub ring: ClipboardRing<Snapshot>,

    /// Selections saved for later restoration.
    pub saved: SavedSelections,
}

impl Store {
    /// Create a new store, using the clipboard capacity from `config`.
    pub fn new(config: &Config) -> Self {
        let ring = match config.clipboard.capacity {
            Some(cap) => ClipboardRing::with_capacity(cap),
            None => ClipboardRing::new(),
        };

        Store {
            counter: RepeatCounter::new(),
            ring,
            saved: SavedSelections::default(),
        }
    }
}
