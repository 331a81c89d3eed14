//! # Error Types
//!
//! ## Overview
//!
//! This module contains the error types returned by the command layer. Most conditions that a
//! user can trigger (an empty clipboard ring, an unmatchable pattern, nothing saved to restore)
//! are handled by falling back to a default behaviour, so the errors here almost always come from
//! the host editor refusing an operation.

/// Failures reported by the host editor through one of its capabilities.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum HostError {
    /// The host refused to apply a batch of edits.
    #[error("Edit rejected: {0}")]
    EditRejected(String),

    /// The host does not know the named built-in command.
    #[error("Unknown host command: {0}")]
    UnknownCommand(String),

    /// The host failed while running a built-in command.
    #[error("Host command {0} failed: {1}")]
    CommandFailed(String, String),
}

/// Errors returned from command execution and configuration loading.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SelkieError {
    /// Failure inside a host capability.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A command identifier that doesn't name any command.
    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    /// A key mapping that isn't a single character.
    #[error("Invalid key mapping: {0:?}")]
    InvalidKey(String),

    /// Failure while reading a configuration file.
    #[error("Input/Output Error: {0}")]
    IOError(#[from] std::io::Error),

    /// Failure while parsing a configuration file.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value that parsed, but can't be used.
    #[error("Invalid setting {0}: {1}")]
    InvalidSetting(&'static str, String),

    /// Failure while rendering a keybinding table.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for host capability calls.
pub type HostResult<V> = Result<V, HostError>;

/// Common result type for command execution.
pub type SelkieResult<V> = Result<V, SelkieError>;
