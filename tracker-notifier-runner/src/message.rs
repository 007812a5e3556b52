// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat summary of a run.

use crate::{
    RunId,
    identity::{is_primary_report, quote, resolve_full_display_name},
    jira::TrackerIssue,
    matcher::find_existing_issue,
};
use swrite::{SWrite, swrite};
use tracker_notifier_metadata::TestReport;

/// The markdown hard line break that ends every line of the message.
const LINE_BREAK: &str = "  \n";

/// Builds the chat message for the failed tests in `reports`.
///
/// Each failed report contributes one line, `Test: "<full display name>" failed in run <run id> `,
/// followed by `current jira issue <key>` if an open issue matches the failure. Returns an empty
/// string if nothing failed.
pub fn prepare_message<'a, I>(reports: I, run_id: RunId, open_issues: &[TrackerIssue]) -> String
where
    I: IntoIterator<Item = &'a TestReport>,
{
    let mut message = String::new();
    for report in reports
        .into_iter()
        .filter(|report| is_primary_report(report) && report.failed())
    {
        swrite!(
            message,
            "Test: {} failed in run {run_id} ",
            quote(&resolve_full_display_name(report)),
        );
        if let Some(issue) = find_existing_issue(open_issues, report) {
            swrite!(message, "current jira issue {}", issue.key);
        }
        message.push_str(LINE_BREAK);
    }
    message
}
