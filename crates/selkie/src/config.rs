//! # Configuration
//!
//! ## Overview
//!
//! Settings are read from a TOML file. Every section is optional, and anything left out falls
//! back to its default:
//!
//! ```toml
//! enabled = true
//!
//! [clipboard]
//! capacity = 60
//!
//! [keys]
//! ";" = "selkie.cancelSelection"
//! "%" = "selkie.selectBuffer"
//! ```
//!
//! Keys listed under `[keys]` are added on top of the default Normal mode bindings. Mapping a key
//! to `selkie.nop` effectively unbinds it.
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{SelkieError, SelkieResult};
use crate::keymap::Keymap;

/// Settings for the clipboard ring.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ClipboardConfig {
    /// How many snapshots to keep, at least 1. When absent, nothing is ever evicted.
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Top-level settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Config {
    /// Whether views start out in Normal mode.
    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,

    /// Clipboard ring settings.
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    /// Extra Normal mode key bindings, from a single character to a command identifier.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: Self::default_enabled(),
            clipboard: ClipboardConfig::default(),
            keys: BTreeMap::new(),
        }
    }
}

impl Config {
    const fn default_enabled() -> bool {
        true
    }

    /// Parse settings from a TOML document.
    pub fn from_toml(s: &str) -> SelkieResult<Self> {
        let config: Config = toml::from_str(s)?;

        config.validate()?;

        Ok(config)
    }

    /// Check values that parse fine but can't be used.
    pub fn validate(&self) -> SelkieResult<()> {
        if self.clipboard.capacity == Some(0) {
            let msg = "a ring that keeps nothing would lose cut text".to_string();

            return Err(SelkieError::InvalidSetting("clipboard.capacity", msg));
        }

        Ok(())
    }

    /// Read settings from `path`, using the defaults if the file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> SelkieResult<Self> {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(target: "selkie.config", path = %path.display(), "config_missing");
                return Ok(Config::default());
            },
            Err(e) => return Err(e.into()),
        };

        let config = Self::from_toml(&content)?;

        info!(
            target: "selkie.config",
            path = %path.display(),
            enabled = config.enabled,
            capacity = ?config.clipboard.capacity,
            keys = config.keys.len(),
            "config_loaded"
        );

        Ok(config)
    }

    /// Build the Normal mode key map: the default bindings, overridden by `[keys]`.
    pub fn keymap(&self) -> SelkieResult<Keymap> {
        let mut keymap = Keymap::default();

        for (key, cmd) in self.keys.iter() {
            keymap.bind_str(key, cmd)?;
        }

        Ok(keymap)
    }
}
