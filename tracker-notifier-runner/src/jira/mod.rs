// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The issue tracker collaborator.
//!
//! Failures are filed as issues in a Jira project (REST API v2) and scheduled into the active
//! sprint of an agile board (Agile API 1.0).

mod client;
mod sprint;
mod types;

pub use client::*;
pub use sprint::*;
pub use types::*;

use crate::errors::JiraError;

/// An issue tracker that failures are filed into.
pub trait IssueTracker {
    /// Resolves the project, board and active sprint that issues are filed into.
    fn resolve_context(&self) -> Result<TrackerContext, JiraError>;

    /// Fetches every open issue filed by the configured reporter.
    fn fetch_open_issues(&self) -> Result<Vec<TrackerIssue>, JiraError>;

    /// Files a new issue and returns it.
    fn create_issue(&self, draft: &IssueDraft) -> Result<TrackerIssue, JiraError>;

    /// Adds a comment to an existing issue.
    fn add_comment(&self, issue: &TrackerIssue, body: &str) -> Result<(), JiraError>;

    /// Moves an issue into a sprint.
    fn move_to_sprint(&self, sprint: &Sprint, issue: &TrackerIssue) -> Result<(), JiraError>;

    /// Checks that the tracker is reachable and configured correctly.
    fn verify(&self) -> Result<(), JiraError> {
        self.resolve_context().map(drop)
    }
}
