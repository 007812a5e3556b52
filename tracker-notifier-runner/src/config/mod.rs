// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for tracker-notifier.
//!
//! ## Config file location
//!
//! The config file is looked up at `$XDG_CONFIG_HOME/tracker-notifier/config.toml` (or
//! `~/.config/tracker-notifier/config.toml` if `XDG_CONFIG_HOME` is unset), unless an explicit
//! path is passed in. The special path `none` skips the config file entirely.
//!
//! ## Configuration hierarchy
//!
//! Settings are resolved in the following order (highest priority first):
//!
//! 1. CLI arguments (e.g. `--jira-board`)
//! 2. Environment variables (e.g. `TRACKER_NOTIFIER_JIRA_BOARD`)
//! 3. The config file
//! 4. Built-in defaults
//!
//! ## Collaborators
//!
//! Each collaborator (`[elastic]`, `[jira]`, `[slack]`, `[webex]`) is enabled by setting any of
//! its required fields, and must then have all of them set.

mod discovery;
mod elements;
mod imp;

pub use discovery::*;
pub use elements::*;
pub use imp::*;
