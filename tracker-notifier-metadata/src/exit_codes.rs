// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `tracker-notifier` failures.
///
/// `tracker-notifier` runs may fail for a variety of reasons. This structure documents the exit
/// codes that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum NotifierExitCode {}

impl NotifierExitCode {
    /// No errors occurred and every configured collaborator received its data.
    pub const OK: i32 = 0;

    /// The run completed, but at least one collaborator (search index, issue tracker or chat)
    /// could not be reached or rejected a request.
    pub const DELIVERY_INCOMPLETE: i32 = 100;

    /// The suite report file could not be read or parsed.
    pub const REPORT_READ_FAILED: i32 = 104;

    /// A configured collaborator failed verification before the run started.
    pub const VERIFY_FAILED: i32 = 105;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a `tracker-notifier` invocation.
    pub const SETUP_ERROR: i32 = 96;
}
