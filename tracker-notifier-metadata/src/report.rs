// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::ReportParseError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use smol_str::SmolStr;
use std::{fmt, time::Duration};

/// All suite reports contained in a single report document.
///
/// Ginkgo writes an array of suite reports (one per suite run by the invocation), but documents
/// holding a single suite object are accepted as well.
#[derive(Clone, Debug, Default)]
pub struct SuiteReports {
    suites: Vec<SuiteReport>,
}

impl SuiteReports {
    /// Parses a report document.
    pub fn parse(json: &str) -> Result<Self, ReportParseError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let suites = if json.trim_start().starts_with('[') {
            serde_path_to_error::deserialize::<_, Vec<SuiteReport>>(&mut deserializer)
        } else {
            serde_path_to_error::deserialize::<_, SuiteReport>(&mut deserializer)
                .map(|suite| vec![suite])
        }
        .map_err(ReportParseError::new)?;

        Ok(Self { suites })
    }

    /// Creates a new `SuiteReports` from already-parsed suites.
    pub fn new(suites: Vec<SuiteReport>) -> Self {
        Self { suites }
    }

    /// Returns the suites in the document, in order.
    pub fn suites(&self) -> &[SuiteReport] {
        &self.suites
    }

    /// Iterates over every test report across all suites, in document order.
    pub fn test_reports(&self) -> impl Iterator<Item = &TestReport> + '_ {
        self.suites.iter().flat_map(|suite| suite.spec_reports.iter())
    }

    /// Flattens the document into one ordered sequence of test reports.
    pub fn into_test_reports(self) -> Vec<TestReport> {
        self.suites
            .into_iter()
            .flat_map(|suite| suite.spec_reports)
            .collect()
    }
}

/// A single suite report.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub struct SuiteReport {
    /// The path to the suite on disk.
    #[serde(default)]
    pub suite_path: String,

    /// The description passed to `RunSpecs`.
    #[serde(default)]
    pub suite_description: String,

    /// Whether the suite as a whole succeeded.
    #[serde(default)]
    pub suite_succeeded: bool,

    /// The reports for every leaf node in the suite.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec_reports: Vec<TestReport>,
}

/// The report for one leaf node: an individual test, or a suite-level hook.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TestReport {
    /// The kind of leaf node this report is for.
    #[serde(default, rename = "LeafNodeType")]
    pub leaf_type: LeafType,

    /// The text of the leaf node. Empty for suite-level nodes.
    #[serde(default, rename = "LeafNodeText")]
    pub leaf_text: String,

    /// Texts of the containers enclosing the leaf node, outermost first.
    #[serde(
        default,
        rename = "ContainerHierarchyTexts",
        deserialize_with = "null_as_default"
    )]
    pub container_path: Vec<String>,

    /// Labels attached to the leaf node. Some labels are of the form `key:value`.
    #[serde(
        default,
        rename = "LeafNodeLabels",
        deserialize_with = "null_as_default"
    )]
    pub labels: Vec<String>,

    /// The final state of the node.
    #[serde(default)]
    pub state: SpecState,

    /// How long the node took to run.
    #[serde(default, deserialize_with = "duration_from_nanos")]
    pub run_time: Duration,

    /// When the node started running.
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,

    /// Whether the node was marked `Serial`.
    #[serde(default)]
    pub is_serial: bool,

    /// Whether the node ran inside an `Ordered` container.
    #[serde(default)]
    pub is_in_ordered_container: bool,

    /// Failure information. Empty unless the node failed.
    #[serde(default)]
    pub failure: Failure,

    /// The parallel worker that produced this report (1-based).
    #[serde(default)]
    pub parallel_process: u32,
}

impl TestReport {
    /// Returns true if the node ended in one of the failure states.
    pub fn failed(&self) -> bool {
        self.state.is_failure()
    }

    /// Returns the full stack trace captured at the failure site, possibly empty.
    pub fn failure_stack_trace(&self) -> &str {
        &self.failure.location.full_stack_trace
    }

    /// Returns the container texts followed by the leaf text, joined by spaces.
    ///
    /// An empty leaf text is left out. The result is empty for suite-level nodes, which have
    /// neither.
    pub fn full_text(&self) -> String {
        let mut texts: Vec<&str> = self.container_path.iter().map(String::as_str).collect();
        if !self.leaf_text.is_empty() {
            texts.push(&self.leaf_text);
        }
        texts.join(" ")
    }

    /// Returns true if this report was produced by the primary parallel worker.
    ///
    /// Serial runs report process 1 as well; a missing value (0) is treated as primary.
    pub fn is_primary_process(&self) -> bool {
        self.parallel_process <= 1
    }
}

/// The kind of a leaf node.
///
/// The string form of each variant is the test framework's own spelling, and is never empty.
/// Kinds this crate does not know about are preserved verbatim in [`LeafType::Other`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "SmolStr")]
pub enum LeafType {
    /// A container (`Describe`, `Context`, `When`).
    Container,
    /// An individual test.
    #[default]
    It,
    /// `BeforeEach`
    BeforeEach,
    /// `JustBeforeEach`
    JustBeforeEach,
    /// `AfterEach`
    AfterEach,
    /// `JustAfterEach`
    JustAfterEach,
    /// `BeforeAll`
    BeforeAll,
    /// `AfterAll`
    AfterAll,
    /// `BeforeSuite`
    BeforeSuite,
    /// `SynchronizedBeforeSuite`: runs once across all parallel workers.
    SynchronizedBeforeSuite,
    /// `AfterSuite`
    AfterSuite,
    /// `SynchronizedAfterSuite`: runs once across all parallel workers.
    SynchronizedAfterSuite,
    /// `ReportBeforeEach`
    ReportBeforeEach,
    /// `ReportAfterEach`
    ReportAfterEach,
    /// `ReportBeforeSuite`
    ReportBeforeSuite,
    /// `ReportAfterSuite`
    ReportAfterSuite,
    /// `DeferCleanup` registered outside of any node.
    CleanupInvalid,
    /// `DeferCleanup` registered in a per-test node.
    CleanupAfterEach,
    /// `DeferCleanup` registered in an `Ordered` container node.
    CleanupAfterAll,
    /// `DeferCleanup` registered in a suite-level node.
    CleanupAfterSuite,
    /// The framework's invalid node type.
    Invalid,
    /// A node kind not known to this crate.
    Other(SmolStr),
}

impl LeafType {
    /// Returns the framework's string form of this leaf type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Container => "Container",
            Self::It => "It",
            Self::BeforeEach => "BeforeEach",
            Self::JustBeforeEach => "JustBeforeEach",
            Self::AfterEach => "AfterEach",
            Self::JustAfterEach => "JustAfterEach",
            Self::BeforeAll => "BeforeAll",
            Self::AfterAll => "AfterAll",
            Self::BeforeSuite => "BeforeSuite",
            Self::SynchronizedBeforeSuite => "SynchronizedBeforeSuite",
            Self::AfterSuite => "AfterSuite",
            Self::SynchronizedAfterSuite => "SynchronizedAfterSuite",
            Self::ReportBeforeEach => "ReportBeforeEach",
            Self::ReportAfterEach => "ReportAfterEach",
            Self::ReportBeforeSuite => "ReportBeforeSuite",
            Self::ReportAfterSuite => "ReportAfterSuite",
            Self::CleanupInvalid => "DeferCleanup",
            Self::CleanupAfterEach => "DeferCleanup (Each)",
            Self::CleanupAfterAll => "DeferCleanup (All)",
            Self::CleanupAfterSuite => "DeferCleanup (Suite)",
            Self::Invalid => "INVALID NODE TYPE",
            Self::Other(other) => other.as_str(),
        }
    }

    /// Returns true for the synchronized suite hooks, which logically run once per suite but
    /// are reported by every parallel worker.
    pub fn is_synchronized_suite(&self) -> bool {
        matches!(
            self,
            Self::SynchronizedBeforeSuite | Self::SynchronizedAfterSuite
        )
    }
}

impl From<SmolStr> for LeafType {
    fn from(s: SmolStr) -> Self {
        match s.as_str() {
            "Container" => Self::Container,
            "It" => Self::It,
            "BeforeEach" => Self::BeforeEach,
            "JustBeforeEach" => Self::JustBeforeEach,
            "AfterEach" => Self::AfterEach,
            "JustAfterEach" => Self::JustAfterEach,
            "BeforeAll" => Self::BeforeAll,
            "AfterAll" => Self::AfterAll,
            "BeforeSuite" => Self::BeforeSuite,
            "SynchronizedBeforeSuite" => Self::SynchronizedBeforeSuite,
            "AfterSuite" => Self::AfterSuite,
            "SynchronizedAfterSuite" => Self::SynchronizedAfterSuite,
            "ReportBeforeEach" => Self::ReportBeforeEach,
            "ReportAfterEach" => Self::ReportAfterEach,
            "ReportBeforeSuite" => Self::ReportBeforeSuite,
            "ReportAfterSuite" => Self::ReportAfterSuite,
            "DeferCleanup" => Self::CleanupInvalid,
            "DeferCleanup (Each)" => Self::CleanupAfterEach,
            "DeferCleanup (All)" => Self::CleanupAfterAll,
            "DeferCleanup (Suite)" => Self::CleanupAfterSuite,
            "" | "INVALID NODE TYPE" => Self::Invalid,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for LeafType {
    fn from(s: &str) -> Self {
        SmolStr::new(s).into()
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The final state of a leaf node.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpecState {
    /// The node is pending.
    Pending,
    /// The node was skipped.
    Skipped,
    /// The node passed.
    Passed,
    /// The node failed an assertion.
    Failed,
    /// The node was aborted, stopping the suite.
    Aborted,
    /// The node panicked.
    Panicked,
    /// The node was interrupted.
    Interrupted,
    /// The node ran past its timeout.
    TimedOut,
    /// The framework's invalid state; also used for unrecognized states.
    #[default]
    #[serde(other)]
    Invalid,
}

impl SpecState {
    /// Returns the framework's string form of this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID SPEC STATE",
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
            Self::Panicked => "panicked",
            Self::Interrupted => "interrupted",
            Self::TimedOut => "timedout",
        }
    }

    /// Returns true if this state counts as a failure.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Failed | Self::Aborted | Self::Panicked | Self::Interrupted | Self::TimedOut
        )
    }
}

impl fmt::Display for SpecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure information for a leaf node.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Failure {
    /// The failure message.
    #[serde(default)]
    pub message: String,

    /// Where the failure happened.
    #[serde(default)]
    pub location: CodeLocation,
}

/// A location in test source code.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CodeLocation {
    /// The source file.
    #[serde(default)]
    pub file_name: String,

    /// The line number within the file.
    #[serde(default)]
    pub line_number: u32,

    /// The full stack trace captured at this location, possibly empty.
    #[serde(default)]
    pub full_stack_trace: String,

    /// A custom message which replaces the `file:line` rendering when set.
    #[serde(default)]
    pub custom_message: String,
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.custom_message.is_empty() {
            return f.write_str(&self.custom_message);
        }
        write!(f, "{}:{}", self.file_name, self.line_number)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn duration_from_nanos<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_nanos)
}
