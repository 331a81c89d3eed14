//! # selkie
//!
//! ## Overview
//!
//! This crate turns a conventional, single-mode text editor into a modal one, with Vim-like
//! Normal and Insert modes and repeatable commands that act on multiple selections at once.
//!
//! The host editor is reached through the capability traits in [host]. A
//! [ModeController](controller::ModeController) receives the host's events (view changes, typed
//! text, and the interactive query prompt's changes) and runs [commands] against it:
//!
//! - [count] accumulates the repeat count typed before a command
//! - [selection] holds the pure transforms applied to each selection
//! - [ring] stores the snapshots captured by cut and copy
//! - [query] implements the live-preview prompts behind replace, select, split and filter
//!
//! ## Example
//!
//! ```
//! use selkie::commands::Command;
//! use selkie::config::Config;
//! use selkie::controller::ModeController;
//! use selkie::host::{memory::MemoryEditor, Document};
//!
//! let mut editor = MemoryEditor::new("one two three");
//! let mut ctl = ModeController::new(&Config::default()).unwrap();
//! ctl.handle_editor_change(Some(&mut editor));
//!
//! // Select the buffer, then split it on spaces.
//! ctl.type_text(&mut editor, "%").unwrap();
//! ctl.execute(&mut editor, Command::ExpressionSplit).unwrap();
//! ctl.query_changed(&mut editor, " ").unwrap();
//! ctl.query_accept(&mut editor);
//!
//! // Cut each word, and paste them back twice.
//! ctl.execute(&mut editor, Command::CutSelected).unwrap();
//! ctl.type_text(&mut editor, "2").unwrap();
//! ctl.execute(&mut editor, Command::PasteBefore).unwrap();
//!
//! assert_eq!(editor.text(), "oneone twotwo threethree");
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]

pub mod bindings;
pub mod commands;
pub mod config;
pub mod controller;
pub mod count;
pub mod errors;
pub mod host;
pub mod keymap;
pub mod query;
pub mod ring;
pub mod selection;
pub mod store;

pub use crossterm;
