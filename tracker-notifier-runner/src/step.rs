// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step logging for report runs.

use std::fmt;
use tracing::info;

/// The tracing target for step messages.
pub const STEP_TARGET: &str = "tracker_notifier::step";

/// Narrates the steps of a report run: which collaborator is being called and what was decided.
///
/// Step messages are `info` events under [`STEP_TARGET`]. A disabled logger drops them, so that
/// runs stay quiet unless step logs were requested. Dry runs always log steps, since the log is
/// then the only record of what would have happened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepLogger {
    enabled: bool,
}

impl StepLogger {
    /// Creates a new step logger.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Creates a step logger that drops every message.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Returns true if step messages are emitted.
    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Emits a step message, if enabled.
    pub fn log(self, message: fmt::Arguments<'_>) {
        if self.enabled {
            info!(target: STEP_TARGET, "{message}");
        }
    }
}
