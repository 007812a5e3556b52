// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    RunId,
    identity::{resolve_description, resolve_maintainer, resolve_summary},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracker_notifier_metadata::TestReport;

/// The issue type of every filed issue.
pub const ISSUE_TYPE: &str = "Bug";

/// The priority of every filed issue.
pub const ISSUE_PRIORITY: &str = "P1";

/// An issue in the tracker.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TrackerIssue {
    /// The numeric id of the issue, as a string.
    pub id: String,

    /// The human-readable key, e.g. `E2E-123`.
    pub key: String,

    /// The fields requested along with the issue, if any.
    #[serde(default)]
    pub fields: Option<IssueFields>,
}

impl TrackerIssue {
    /// Returns the summary of the issue, if fields were fetched and the summary is set.
    pub fn summary(&self) -> Option<&str> {
        self.fields.as_ref()?.summary.as_deref()
    }

    /// Returns the description of the issue, if fields were fetched and the description is set.
    pub fn description(&self) -> Option<&str> {
        self.fields.as_ref()?.description.as_deref()
    }
}

/// The subset of issue fields used for deduplication.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssueFields {
    /// The issue summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// The issue description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A project in the tracker.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// The project id.
    pub id: String,

    /// The project key, used in JQL and when filing issues.
    pub key: String,

    /// The project name.
    #[serde(default)]
    pub name: String,
}

/// An agile board.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Board {
    /// The board id.
    pub id: u64,

    /// The board name.
    pub name: String,
}

/// A sprint on an agile board.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    /// The sprint id.
    pub id: u64,

    /// The sprint name.
    #[serde(default)]
    pub name: String,

    /// The sprint state (`active`, `closed` or `future`).
    #[serde(default)]
    pub state: String,

    /// When the sprint started, if it has.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// When the sprint ends or ended, if planned.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Everything needed to file an issue and schedule it: the project and the active sprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerContext {
    /// The project that issues are filed in.
    pub project_key: String,

    /// The component that new issues are filed under, if any.
    pub component: Option<String>,

    /// The board that the sprint belongs to.
    pub board: Board,

    /// The sprint that issues are moved to.
    pub sprint: Sprint,
}

/// A new issue to be filed for a failed test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueDraft {
    /// The project to file the issue in.
    pub project_key: String,

    /// The issue summary.
    pub summary: String,

    /// The issue description, used to deduplicate future failures.
    pub description: String,

    /// The component to file the issue under.
    pub component: Option<String>,

    /// The user to assign the issue to.
    pub assignee: Option<String>,
}

impl IssueDraft {
    /// Creates a draft for the failure in `report`, assigned to the test's maintainer if known.
    pub fn new(project_key: &str, component: Option<&str>, report: &TestReport) -> Self {
        let maintainer = resolve_maintainer(report);
        Self {
            project_key: project_key.to_owned(),
            summary: resolve_summary(report).to_owned(),
            description: resolve_description(report),
            component: component.filter(|c| !c.is_empty()).map(str::to_owned),
            assignee: (!maintainer.is_empty()).then(|| maintainer.to_owned()),
        }
    }
}

/// Returns the comment added to an issue each time its test fails.
pub fn failure_comment(run_id: RunId, report: &TestReport) -> String {
    let location = &report.failure.location;
    format!(
        "Run: {run_id}\n\nFailure Location: {location}\n\nFull Stack Trace {}",
        location.full_stack_trace
    )
}
