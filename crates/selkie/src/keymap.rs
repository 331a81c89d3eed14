//! # Normal mode key map
//!
//! Characters typed in Normal mode that aren't digits are looked up in a [Keymap]. Mapped
//! characters run their [Command] immediately; everything else is swallowed.
use std::collections::HashMap;

use crate::commands::Command;
use crate::errors::{SelkieError, SelkieResult};

/// Maps typed characters to the commands they run in Normal mode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Keymap {
    map: HashMap<char, Command>,
}

impl Keymap {
    /// Create a map with no bindings.
    pub fn empty() -> Self {
        Keymap { map: HashMap::new() }
    }

    /// Look up the command bound to `c`.
    pub fn get(&self, c: char) -> Option<Command> {
        self.map.get(&c).copied()
    }

    /// Bind `c` to `cmd`, returning the previous binding.
    ///
    /// Digits always feed the repeat count, so they can't be bound.
    pub fn bind(&mut self, c: char, cmd: Command) -> SelkieResult<Option<Command>> {
        if c.is_ascii_digit() {
            return Err(SelkieError::InvalidKey(c.to_string()));
        }

        Ok(self.map.insert(c, cmd))
    }

    /// Remove the binding for `c`.
    pub fn unbind(&mut self, c: char) -> Option<Command> {
        self.map.remove(&c)
    }

    /// Bind the first and only character of `key` to the command named `cmd`.
    pub fn bind_str(&mut self, key: &str, cmd: &str) -> SelkieResult<Option<Command>> {
        let mut chars = key.chars();

        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(SelkieError::InvalidKey(key.to_string()));
        };

        self.bind(c, cmd.parse()?)
    }

    /// Number of bound characters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let map = HashMap::from([(';', Command::CancelSelection), ('%', Command::SelectBuffer)]);

        Keymap { map }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let keymap = Keymap::default();

        assert_eq!(keymap.get(';'), Some(Command::CancelSelection));
        assert_eq!(keymap.get('%'), Some(Command::SelectBuffer));
        assert_eq!(keymap.get('x'), None);
        assert_eq!(keymap.len(), 2);
    }

    #[test]
    fn test_bind_str() {
        let mut keymap = Keymap::empty();

        let prev = keymap.bind_str("p", "selkie.pasteAfter").unwrap();
        assert_eq!(prev, None);
        assert_eq!(keymap.get('p'), Some(Command::PasteAfter));

        let prev = keymap.bind_str("p", "selkie.pasteBefore").unwrap();
        assert_eq!(prev, Some(Command::PasteAfter));

        assert!(matches!(keymap.bind_str("pp", "selkie.nop"), Err(SelkieError::InvalidKey(_))));
        assert!(matches!(keymap.bind_str("", "selkie.nop"), Err(SelkieError::InvalidKey(_))));
        assert!(matches!(keymap.bind_str("3", "selkie.nop"), Err(SelkieError::InvalidKey(_))));
        assert!(matches!(keymap.bind_str("q", "nop"), Err(SelkieError::UnknownCommand(_))));

        assert_eq!(keymap.unbind('p'), Some(Command::PasteBefore));
        assert!(keymap.is_empty());
    }
}
