// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matches a failing test against the issues already open in the tracker.

use crate::{
    identity::{resolve_description, resolve_summary},
    jira::TrackerIssue,
};
use tracker_notifier_metadata::TestReport;

/// Finds the open issue that already tracks the failure in `report`, if any.
///
/// Two passes run in strict priority order, and the first hit wins:
///
/// 1. An issue whose description equals [`resolve_description`] for the report. The description
///    encodes both the test and its failure location, so this pass rarely yields false positives.
/// 2. An issue whose summary equals [`resolve_summary`] for the report. On repeat failures the
///    failure location may move while the summary stays put; this pass trades precision for
///    recall.
///
/// Comparison is exact, with no normalization. Issues without fields never match.
///
/// Returning `None` means the caller should file a new issue.
pub fn find_existing_issue<'a>(
    open_issues: &'a [TrackerIssue],
    report: &TestReport,
) -> Option<&'a TrackerIssue> {
    let description = resolve_description(report);
    if let Some(issue) = open_issues
        .iter()
        .find(|issue| issue.description() == Some(description.as_str()))
    {
        return Some(issue);
    }

    let summary = resolve_summary(report);
    open_issues
        .iter()
        .find(|issue| issue.summary() == Some(summary))
}
