//! # Host keybinding table
//!
//! Hosts that deliver keys through their own binding tables need every key that Normal mode
//! cares about to be claimed while Normal mode is active, so that nothing falls through to the
//! host's default handling. [default_bindings] produces that table, binding each key to
//! [Command::Nop] under [WHEN_NORMAL], and [to_json] renders it for the host.
use serde::Serialize;

use crate::commands::Command;
use crate::errors::SelkieResult;

/// Condition under which the generated bindings apply.
pub const WHEN_NORMAL: &str = "editorTextFocus && selkie.activated && selkie.enabled";

/// A single host keybinding.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KeyBinding {
    /// The key chord, in the host's notation (for example, `Ctrl+a`).
    pub key: String,

    /// The command identifier to run.
    pub command: String,

    /// The host context condition.
    pub when: String,
}

impl KeyBinding {
    /// Bind `key` to `cmd` while Normal mode is active.
    pub fn normal<K: Into<String>>(key: K, cmd: Command) -> Self {
        KeyBinding {
            key: key.into(),
            command: cmd.name().to_string(),
            when: WHEN_NORMAL.to_string(),
        }
    }
}

fn with_modifiers(key: &str) -> [KeyBinding; 3] {
    [
        KeyBinding::normal(key, Command::Nop),
        KeyBinding::normal(format!("Alt+{key}"), Command::Nop),
        KeyBinding::normal(format!("Ctrl+{key}"), Command::Nop),
    ]
}

/// Claim escape, the digits, and every letter (alone, shifted, and with Alt or Ctrl).
pub fn default_bindings() -> Vec<KeyBinding> {
    let mut bindings = vec![KeyBinding::normal("escape", Command::Nop)];

    bindings.extend(('0'..='9').map(|d| KeyBinding::normal(d.to_string(), Command::Nop)));

    for c in 'a'..='z' {
        bindings.extend(with_modifiers(&c.to_string()));
        bindings.extend(with_modifiers(&format!("Shift+{c}")));
    }

    return bindings;
}

/// Render bindings as a tab-indented JSON array.
pub fn to_json(bindings: &[KeyBinding]) -> SelkieResult<String> {
    let mut out = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);

    bindings.serialize(&mut ser)?;

    Ok(String::from_utf8_lossy(&out).into_owned())
}
