//! # Clipboard ring
//!
//! ## Overview
//!
//! Every cut or copy captures a snapshot holding one string per selection, and pushes it onto a
//! [ClipboardRing]. Pasting always uses the most recent snapshot; [ClipboardRing::prev] and
//! [ClipboardRing::next] rotate older snapshots into that position without discarding anything.
//!
//! ```
//! use selkie::ring::ClipboardRing;
//!
//! let mut ring = ClipboardRing::default();
//! ring.push("a");
//! ring.push("b");
//! assert_eq!(ring.recent(), Some(&"b"));
//!
//! ring.prev();
//! assert_eq!(ring.recent(), Some(&"a"));
//!
//! ring.next();
//! assert_eq!(ring.recent(), Some(&"b"));
//! ```
use std::collections::VecDeque;

use tracing::trace;

/// The text captured from each selection by a single cut or copy.
pub type Snapshot = Vec<String>;

/// A rotatable history of values, where the last element is the most recent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClipboardRing<T> {
    data: VecDeque<T>,
    capacity: Option<usize>,
}

impl<T> ClipboardRing<T> {
    /// Create a ring that never evicts anything.
    pub fn new() -> Self {
        ClipboardRing { data: VecDeque::new(), capacity: None }
    }

    /// Create a ring that evicts its oldest entry once it holds more than `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        ClipboardRing {
            data: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// The configured eviction bound, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Make `item` the most recent entry.
    pub fn push(&mut self, item: T) {
        self.data.push_back(item);

        if let Some(cap) = self.capacity {
            while self.data.len() > cap {
                let _ = self.data.pop_front();
            }
        }

        trace!(target: "selkie.ring", len = self.data.len(), "push");
    }

    /// The most recent entry.
    pub fn recent(&self) -> Option<&T> {
        self.data.back()
    }

    /// The most recent entry, or `default` when the ring is empty.
    pub fn recent_or<'a>(&'a self, default: &'a T) -> &'a T {
        self.recent().unwrap_or(default)
    }

    /// Move the most recent entry to the front, making the one before it the most recent.
    pub fn prev(&mut self) {
        if let Some(item) = self.data.pop_back() {
            self.data.push_front(item);
        }
    }

    /// Move the oldest entry to the back, undoing a previous [ClipboardRing::prev].
    pub fn next(&mut self) {
        if let Some(item) = self.data.pop_front() {
            self.data.push_back(item);
        }
    }

    /// Iterate over the entries, from oldest to most recent.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Default for ClipboardRing<T> {
    fn default() -> Self {
        ClipboardRing::new()
    }
}

/// Pick the text that the selection at `idx` receives when pasting `snapshot`.
///
/// Selections wrap around the snapshot, so pasting two strings over five selections hands out
/// the strings in the order `0, 1, 0, 1, 0`.
pub fn snapshot_value(snapshot: &[String], idx: usize) -> Option<&str> {
    if snapshot.is_empty() {
        return None;
    }

    snapshot.get(idx % snapshot.len()).map(String::as_str)
}
