// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The report pipeline: forwards the test reports of a run to every configured collaborator.
//!
//! A run goes through these steps, in order:
//!
//! 1. every test report is stored in the search index;
//! 2. the open issues filed by the configured reporter are fetched, once;
//! 3. each failure is either commented on (if an open issue matches it) or filed as a new issue,
//!    and the issue is moved to the active sprint;
//! 4. a summary of the failures is built, pointing at the matching issues;
//! 5. the summary is posted to every chat notifier.
//!
//! A collaborator failing does not stop the run: the failure is logged, recorded in the
//! [`RunOutcome`], and the next step proceeds. In dry-run mode, nothing is written to any
//! collaborator, but every decision is made and logged as it would be otherwise.

use crate::{
    RunId,
    chat::ChatNotifier,
    elastic::{IndexRecord, IndexWriter, index_doc_id},
    errors::{CollaboratorError, DisplayErrorChain, JiraError, VerifyError},
    identity::{is_primary_report, resolve_summary},
    jira::{IssueDraft, IssueTracker, TrackerContext, TrackerIssue, failure_comment},
    matcher::find_existing_issue,
    message::prepare_message,
    step::StepLogger,
};
use tracing::{debug, warn};
use tracker_notifier_metadata::TestReport;

/// Forwards test reports to the search index, the issue tracker and chat notifiers.
pub struct ReportPipeline<'a> {
    dry_run: bool,
    steps: StepLogger,
    index: Option<&'a dyn IndexWriter>,
    tracker: Option<&'a dyn IssueTracker>,
    notifiers: Vec<&'a dyn ChatNotifier>,
}

impl<'a> ReportPipeline<'a> {
    /// Creates a pipeline with no collaborators.
    ///
    /// Step messages are logged if `steps` is enabled, or always if `dry_run` is set.
    pub fn new(dry_run: bool, steps: StepLogger) -> Self {
        Self {
            dry_run,
            steps: if dry_run { StepLogger::new(true) } else { steps },
            index: None,
            tracker: None,
            notifiers: Vec::new(),
        }
    }

    /// Sets the search index that results are stored in.
    pub fn with_index(mut self, index: &'a dyn IndexWriter) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the issue tracker that failures are filed into.
    pub fn with_tracker(mut self, tracker: &'a dyn IssueTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Adds a chat notifier. Notifiers are verified and sent to in the order they are added.
    pub fn with_notifier(mut self, notifier: &'a dyn ChatNotifier) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Returns true if this is a dry run.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns true if no collaborator is configured.
    pub fn has_no_collaborators(&self) -> bool {
        self.index.is_none() && self.tracker.is_none() && self.notifiers.is_empty()
    }

    /// Verifies every collaborator: the search index first, then chat notifiers, then the issue
    /// tracker.
    ///
    /// Verification only reads from collaborators, so it also runs in dry-run mode. The first
    /// failure is returned.
    pub fn verify(&self) -> Result<(), VerifyError> {
        if let Some(index) = self.index {
            debug!("verifying search index");
            index
                .verify()
                .map_err(|err| VerifyError::new(CollaboratorError::Index(err)))?;
        }
        for notifier in &self.notifiers {
            debug!("verifying {}", notifier.destination());
            notifier.verify().map_err(|err| {
                VerifyError::new(CollaboratorError::Chat {
                    notifier: notifier.name().to_owned(),
                    err,
                })
            })?;
        }
        if let Some(tracker) = self.tracker {
            debug!("verifying issue tracker");
            tracker
                .verify()
                .map_err(|err| VerifyError::new(CollaboratorError::Tracker(err)))?;
        }
        Ok(())
    }

    /// Forwards `reports`, the results of run `run_id`, to every collaborator.
    pub fn run(&self, run_id: RunId, reports: &[TestReport]) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        if let Some(index) = self.index {
            self.store_results(index, run_id, reports, &mut outcome);
        }

        let open_issues = match self.tracker {
            Some(tracker) => self.file_issues(tracker, run_id, reports, &mut outcome),
            None => Vec::new(),
        };

        outcome.message = prepare_message(reports, run_id, &open_issues);
        if outcome.message.is_empty() {
            debug!("no failed tests in run {run_id}, not sending notifications");
        } else {
            for notifier in &self.notifiers {
                self.send_message(*notifier, &mut outcome);
            }
        }

        outcome
    }

    /// Fetches the open issues that failures of this run would be matched against.
    ///
    /// No issues are filed or commented on.
    pub fn open_issues(&self) -> Result<Vec<TrackerIssue>, JiraError> {
        match self.tracker {
            Some(tracker) => tracker.fetch_open_issues(),
            None => Ok(Vec::new()),
        }
    }

    fn store_results(
        &self,
        index: &dyn IndexWriter,
        run_id: RunId,
        reports: &[TestReport],
        outcome: &mut RunOutcome,
    ) {
        self.steps
            .log(format_args!("Save results to elastic db. Run {run_id}"));

        for report in reports.iter().filter(|report| is_primary_report(report)) {
            let record = IndexRecord::new(report, run_id);
            let doc_id = index_doc_id(run_id, &record.name);
            if self.dry_run {
                self.steps
                    .log(format_args!("Would store result {doc_id}: {record:?}"));
                continue;
            }

            match index.store(&doc_id, &record) {
                Ok(()) => {
                    debug!("stored result {doc_id}");
                    outcome.records_stored += 1;
                }
                Err(err) => {
                    let err = CollaboratorError::Index(err);
                    warn!("{}", DisplayErrorChain::new(&err));
                    outcome.records_failed += 1;
                    outcome.failures.push(err);
                }
            }
        }
    }

    /// Files or comments on an issue for each failure, and returns the open issues including
    /// those filed during this run.
    fn file_issues(
        &self,
        tracker: &dyn IssueTracker,
        run_id: RunId,
        reports: &[TestReport],
        outcome: &mut RunOutcome,
    ) -> Vec<TrackerIssue> {
        self.steps
            .log(format_args!("File jira issue for failed tests. Run {run_id}"));

        let mut open_issues = match tracker.fetch_open_issues() {
            Ok(issues) => issues,
            Err(err) => {
                // Without the open issues, every failure would be filed as a duplicate.
                self.record_tracker_failure(err, outcome);
                return Vec::new();
            }
        };

        let context = match tracker.resolve_context() {
            Ok(context) => context,
            Err(err) => {
                self.record_tracker_failure(err, outcome);
                return open_issues;
            }
        };

        let failures = reports.iter().filter(|report| {
            is_primary_report(report) && report.failed() && !report.failure_stack_trace().is_empty()
        });
        for report in failures {
            let summary = resolve_summary(report);
            match find_existing_issue(&open_issues, report) {
                Some(issue) => {
                    self.steps
                        .log(format_args!("Adding comment to issue for test {summary}"));
                    let action = IssueAction::Commented {
                        summary: summary.to_owned(),
                        issue_key: issue.key.clone(),
                    };
                    if !self.dry_run {
                        let comment = failure_comment(run_id, report);
                        if let Err(err) = Self::update_issue(tracker, &context, issue, &comment) {
                            self.record_tracker_failure(err, outcome);
                            continue;
                        }
                    }
                    outcome.issue_actions.push(action);
                }
                None => {
                    self.steps
                        .log(format_args!("Filing issue for test {summary}"));
                    let draft =
                        IssueDraft::new(&context.project_key, context.component.as_deref(), report);
                    if self.dry_run {
                        self.steps.log(format_args!("Would file issue: {draft:?}"));
                        outcome.issue_actions.push(IssueAction::Filed {
                            summary: summary.to_owned(),
                            issue_key: None,
                        });
                        continue;
                    }

                    let issue = match tracker.create_issue(&draft) {
                        Ok(issue) => issue,
                        Err(err) => {
                            self.record_tracker_failure(err, outcome);
                            continue;
                        }
                    };
                    outcome.issue_actions.push(IssueAction::Filed {
                        summary: summary.to_owned(),
                        issue_key: Some(issue.key.clone()),
                    });

                    // The issue exists even if the follow-up calls fail.
                    let comment = failure_comment(run_id, report);
                    if let Err(err) = Self::update_issue(tracker, &context, &issue, &comment) {
                        self.record_tracker_failure(err, outcome);
                    }
                    // Later failures of the same test in this run comment on it.
                    open_issues.push(issue);
                }
            }
        }

        open_issues
    }

    fn update_issue(
        tracker: &dyn IssueTracker,
        context: &TrackerContext,
        issue: &TrackerIssue,
        comment: &str,
    ) -> Result<(), JiraError> {
        tracker.add_comment(issue, comment)?;
        tracker.move_to_sprint(&context.sprint, issue)
    }

    fn send_message(&self, notifier: &dyn ChatNotifier, outcome: &mut RunOutcome) {
        self.steps.log(format_args!(
            "Send failed tests notification to {}",
            notifier.destination()
        ));
        if self.dry_run {
            self.steps
                .log(format_args!("Would send message:\n{}", outcome.message));
            return;
        }

        match notifier.send(&outcome.message) {
            Ok(()) => outcome.notifications_sent += 1,
            Err(err) => {
                let err = CollaboratorError::Chat {
                    notifier: notifier.name().to_owned(),
                    err,
                };
                warn!("{}", DisplayErrorChain::new(&err));
                outcome.failures.push(err);
            }
        }
    }

    fn record_tracker_failure(&self, err: JiraError, outcome: &mut RunOutcome) {
        let err = CollaboratorError::Tracker(err);
        warn!("{}", DisplayErrorChain::new(&err));
        outcome.failures.push(err);
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// The number of results stored in the search index.
    pub records_stored: usize,

    /// The number of results the search index rejected.
    pub records_failed: usize,

    /// The issues commented on or filed, in the order of the reports.
    pub issue_actions: Vec<IssueAction>,

    /// The chat message built for the run, empty if no test failed.
    pub message: String,

    /// The number of chat notifiers the message was posted to.
    pub notifications_sent: usize,

    /// Every collaborator failure, in the order they happened.
    pub failures: Vec<CollaboratorError>,
}

impl RunOutcome {
    /// Returns true if every collaborator call succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What was done in the issue tracker for a failed test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueAction {
    /// An open issue matched the failure, and was commented on.
    Commented {
        /// The summary of the failed test.
        summary: String,

        /// The key of the issue.
        issue_key: String,
    },

    /// A new issue was filed.
    Filed {
        /// The summary of the failed test.
        summary: String,

        /// The key of the new issue, or `None` in dry-run mode.
        issue_key: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{ChatError, ElasticError, HttpError},
        jira::{Board, IssueFields, Sprint},
    };
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tracker_notifier_metadata::{CodeLocation, Failure, LeafType, SpecState};

    fn run_id() -> RunId {
        RunId::new(1623).expect("non-zero")
    }

    #[derive(Default)]
    struct FakeIndex {
        fail_for: Option<&'static str>,
        stored: RefCell<Vec<String>>,
    }

    impl IndexWriter for FakeIndex {
        fn verify(&self) -> Result<(), ElasticError> {
            Ok(())
        }

        fn store(&self, doc_id: &str, _record: &IndexRecord) -> Result<(), ElasticError> {
            if self.fail_for == Some(doc_id) {
                return Err(ElasticError::UnexpectedStatus {
                    index: "e2e".to_owned(),
                    status: 503,
                });
            }
            self.stored.borrow_mut().push(doc_id.to_owned());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeTracker {
        open_issues: Vec<TrackerIssue>,
        no_sprint: bool,
        fail_comments: bool,
        calls: RefCell<Vec<String>>,
    }

    impl IssueTracker for FakeTracker {
        fn resolve_context(&self) -> Result<TrackerContext, JiraError> {
            if self.no_sprint {
                return Err(JiraError::NoActiveSprint {
                    board: "E2E board".to_owned(),
                });
            }
            Ok(TrackerContext {
                project_key: "E2E".to_owned(),
                component: Some("networking".to_owned()),
                board: Board {
                    id: 7,
                    name: "E2E board".to_owned(),
                },
                sprint: Sprint {
                    id: 31,
                    name: "Sprint 31".to_owned(),
                    state: "active".to_owned(),
                    start_date: None,
                    end_date: None,
                },
            })
        }

        fn fetch_open_issues(&self) -> Result<Vec<TrackerIssue>, JiraError> {
            Ok(self.open_issues.clone())
        }

        fn create_issue(&self, draft: &IssueDraft) -> Result<TrackerIssue, JiraError> {
            let mut calls = self.calls.borrow_mut();
            let key = format!("E2E-{}", 100 + calls.len());
            calls.push(format!("create {key} {}", draft.summary));
            Ok(TrackerIssue {
                id: key.clone(),
                key,
                fields: Some(IssueFields {
                    summary: Some(draft.summary.clone()),
                    description: Some(draft.description.clone()),
                }),
            })
        }

        fn add_comment(&self, issue: &TrackerIssue, body: &str) -> Result<(), JiraError> {
            if self.fail_comments {
                return Err(JiraError::Comment {
                    issue: issue.key.clone(),
                    err: HttpError::Status {
                        method: "POST",
                        url: format!("https://jira.example.com/rest/api/2/issue/{}/comment", issue.id),
                        status: 500,
                        body: String::new(),
                    },
                });
            }
            let run_line = body.lines().next().unwrap_or_default();
            self.calls
                .borrow_mut()
                .push(format!("comment {} {run_line}", issue.key));
            Ok(())
        }

        fn move_to_sprint(&self, sprint: &Sprint, issue: &TrackerIssue) -> Result<(), JiraError> {
            self.calls
                .borrow_mut()
                .push(format!("move {} to {}", issue.key, sprint.id));
            Ok(())
        }
    }

    struct FakeNotifier {
        name: &'static str,
        fail: bool,
        sent: RefCell<Vec<String>>,
    }

    impl FakeNotifier {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                fail: false,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatNotifier for FakeNotifier {
        fn name(&self) -> &str {
            self.name
        }

        fn destination(&self) -> String {
            format!("{} e2e-alerts", self.name)
        }

        fn verify(&self) -> Result<(), ChatError> {
            if self.fail {
                return Err(ChatError::ChannelNotFound {
                    channel: "e2e-alerts".to_owned(),
                });
            }
            Ok(())
        }

        fn send(&self, text: &str) -> Result<(), ChatError> {
            if self.fail {
                return Err(ChatError::SlackApi {
                    method: "chat.postMessage",
                    error: "not_in_channel".to_owned(),
                });
            }
            self.sent.borrow_mut().push(text.to_owned());
            Ok(())
        }
    }

    fn failed(leaf_text: &str) -> TestReport {
        TestReport {
            leaf_text: leaf_text.to_owned(),
            container_path: vec!["Cluster".to_owned()],
            state: SpecState::Failed,
            failure: Failure {
                message: "expected true".to_owned(),
                location: CodeLocation {
                    file_name: "/src/e2e/cluster_test.go".to_owned(),
                    line_number: 42,
                    full_stack_trace: "e2e.glob..func1()\n\t/src/e2e/cluster_test.go:42 +0x1d"
                        .to_owned(),
                    ..Default::default()
                },
            },
            ..Default::default()
        }
    }

    fn passed(leaf_text: &str) -> TestReport {
        TestReport {
            leaf_text: leaf_text.to_owned(),
            state: SpecState::Passed,
            ..Default::default()
        }
    }

    fn open_issue(key: &str, report: &TestReport) -> TrackerIssue {
        TrackerIssue {
            id: key.to_owned(),
            key: key.to_owned(),
            fields: Some(IssueFields {
                summary: Some(resolve_summary(report).to_owned()),
                description: Some(crate::identity::resolve_description(report)),
            }),
        }
    }

    #[test]
    fn files_new_failures_and_comments_on_known_ones() {
        let known = failed("deletes cluster");
        let reports = [passed("creates cluster"), failed("scales cluster"), known.clone()];
        let index = FakeIndex::default();
        let tracker = FakeTracker {
            open_issues: vec![open_issue("E2E-7", &known)],
            ..Default::default()
        };
        let slack = FakeNotifier::new("slack");

        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_index(&index)
            .with_tracker(&tracker)
            .with_notifier(&slack)
            .run(run_id(), &reports);

        assert!(outcome.is_complete(), "{:?}", outcome.failures);
        assert_eq!(outcome.records_stored, 3);
        assert_eq!(
            *index.stored.borrow(),
            [
                "run_1623_test_creates_cluster",
                "run_1623_test_scales_cluster",
                "run_1623_test_deletes_cluster",
            ]
        );
        assert_eq!(
            *tracker.calls.borrow(),
            [
                "create E2E-100 scales cluster",
                "comment E2E-100 Run: 1623",
                "move E2E-100 to 31",
                "comment E2E-7 Run: 1623",
                "move E2E-7 to 31",
            ]
        );
        assert_eq!(
            outcome.issue_actions,
            [
                IssueAction::Filed {
                    summary: "scales cluster".to_owned(),
                    issue_key: Some("E2E-100".to_owned()),
                },
                IssueAction::Commented {
                    summary: "deletes cluster".to_owned(),
                    issue_key: "E2E-7".to_owned(),
                },
            ]
        );
        assert_eq!(
            *slack.sent.borrow(),
            ["Test: \"Cluster scales cluster\" failed in run 1623 current jira issue E2E-100  \n\
              Test: \"Cluster deletes cluster\" failed in run 1623 current jira issue E2E-7  \n"]
        );
        assert_eq!(outcome.notifications_sent, 1);
    }

    #[test]
    fn synchronized_suite_failure_forwarded_once() {
        let worker = |parallel_process| TestReport {
            leaf_type: LeafType::SynchronizedBeforeSuite,
            container_path: Vec::new(),
            parallel_process,
            ..failed("")
        };
        let reports = [worker(1), worker(2)];
        let index = FakeIndex::default();
        let tracker = FakeTracker::default();

        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_index(&index)
            .with_tracker(&tracker)
            .run(run_id(), &reports);

        assert_eq!(
            *index.stored.borrow(),
            ["run_1623_test_SynchronizedBeforeSuite"]
        );
        assert_eq!(
            *tracker.calls.borrow(),
            [
                "create E2E-100 SynchronizedBeforeSuite",
                "comment E2E-100 Run: 1623",
                "move E2E-100 to 31",
            ]
        );
        assert_eq!(
            outcome.message,
            "Test: \"SynchronizedBeforeSuite\" failed in run 1623 current jira issue E2E-100  \n"
        );
    }

    #[test]
    fn failures_without_stack_trace_are_not_filed() {
        let mut report = failed("scales cluster");
        report.failure.location.full_stack_trace.clear();
        let tracker = FakeTracker::default();

        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_tracker(&tracker)
            .run(run_id(), &[report]);

        assert!(tracker.calls.borrow().is_empty());
        assert!(outcome.issue_actions.is_empty());
        assert_eq!(
            outcome.message,
            "Test: \"Cluster scales cluster\" failed in run 1623   \n"
        );
    }

    #[test]
    fn filed_issue_kept_when_comment_fails() {
        let reports = [failed("scales cluster"), failed("scales cluster")];
        let tracker = FakeTracker {
            fail_comments: true,
            ..Default::default()
        };

        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_tracker(&tracker)
            .run(run_id(), &reports);

        assert_eq!(*tracker.calls.borrow(), ["create E2E-100 scales cluster"]);
        assert_eq!(
            outcome.issue_actions,
            [IssueAction::Filed {
                summary: "scales cluster".to_owned(),
                issue_key: Some("E2E-100".to_owned()),
            }]
        );
        let collaborators: Vec<_> = outcome
            .failures
            .iter()
            .map(|err| err.collaborator())
            .collect();
        assert_eq!(collaborators, ["jira", "jira"]);
        assert_eq!(
            outcome.message,
            "Test: \"Cluster scales cluster\" failed in run 1623 current jira issue E2E-100  \n\
             Test: \"Cluster scales cluster\" failed in run 1623 current jira issue E2E-100  \n"
        );
    }

    #[test]
    fn repeated_failure_comments_on_issue_filed_in_same_run() {
        let reports = [failed("scales cluster"), failed("scales cluster")];
        let tracker = FakeTracker::default();

        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_tracker(&tracker)
            .run(run_id(), &reports);

        assert_eq!(
            *tracker.calls.borrow(),
            [
                "create E2E-100 scales cluster",
                "comment E2E-100 Run: 1623",
                "move E2E-100 to 31",
                "comment E2E-100 Run: 1623",
                "move E2E-100 to 31",
            ]
        );
        assert_eq!(outcome.issue_actions.len(), 2);
    }

    #[test]
    fn dry_run_makes_no_changes() {
        let known = failed("deletes cluster");
        let reports = [failed("scales cluster"), known.clone()];
        let index = FakeIndex::default();
        let tracker = FakeTracker {
            open_issues: vec![open_issue("E2E-7", &known)],
            ..Default::default()
        };
        let slack = FakeNotifier::new("slack");

        let pipeline = ReportPipeline::new(true, StepLogger::disabled())
            .with_index(&index)
            .with_tracker(&tracker)
            .with_notifier(&slack);
        assert!(pipeline.is_dry_run());
        let outcome = pipeline.run(run_id(), &reports);

        assert!(outcome.is_complete());
        assert_eq!(outcome.records_stored, 0);
        assert!(index.stored.borrow().is_empty());
        assert!(tracker.calls.borrow().is_empty());
        assert!(slack.sent.borrow().is_empty());
        assert_eq!(outcome.notifications_sent, 0);
        assert_eq!(
            outcome.issue_actions,
            [
                IssueAction::Filed {
                    summary: "scales cluster".to_owned(),
                    issue_key: None,
                },
                IssueAction::Commented {
                    summary: "deletes cluster".to_owned(),
                    issue_key: "E2E-7".to_owned(),
                },
            ]
        );
        assert!(
            outcome
                .message
                .contains("Test: \"Cluster deletes cluster\" failed in run 1623 current jira issue E2E-7"),
            "{}",
            outcome.message
        );
    }

    #[test]
    fn dry_run_forces_step_logs() {
        let pipeline = ReportPipeline::new(true, StepLogger::disabled());
        assert!(pipeline.steps.is_enabled());

        let pipeline = ReportPipeline::new(false, StepLogger::disabled());
        assert!(!pipeline.steps.is_enabled());
    }

    #[test]
    fn delivery_continues_after_failures() {
        let reports = [failed("scales cluster"), failed("deletes cluster")];
        let index = FakeIndex {
            fail_for: Some("run_1623_test_scales_cluster"),
            ..Default::default()
        };
        let tracker = FakeTracker {
            no_sprint: true,
            ..Default::default()
        };
        let webex = FakeNotifier {
            fail: true,
            ..FakeNotifier::new("webex")
        };
        let slack = FakeNotifier::new("slack");

        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_index(&index)
            .with_tracker(&tracker)
            .with_notifier(&webex)
            .with_notifier(&slack)
            .run(run_id(), &reports);

        assert_eq!(outcome.records_stored, 1);
        assert_eq!(outcome.records_failed, 1);
        assert!(tracker.calls.borrow().is_empty());
        assert_eq!(slack.sent.borrow().len(), 1);
        assert_eq!(outcome.notifications_sent, 1);

        let collaborators: Vec<_> = outcome
            .failures
            .iter()
            .map(|err| err.collaborator())
            .collect();
        assert_eq!(collaborators, ["elastic", "jira", "webex"]);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn no_failures_sends_nothing() {
        let slack = FakeNotifier::new("slack");
        let outcome = ReportPipeline::new(false, StepLogger::disabled())
            .with_notifier(&slack)
            .run(run_id(), &[passed("creates cluster")]);

        assert_eq!(outcome.message, "");
        assert!(slack.sent.borrow().is_empty());
        assert!(outcome.is_complete());
    }

    #[test]
    fn verify_reports_failing_collaborator() {
        let index = FakeIndex::default();
        let tracker = FakeTracker::default();
        let webex = FakeNotifier::new("webex");
        let slack = FakeNotifier {
            fail: true,
            ..FakeNotifier::new("slack")
        };

        let pipeline = ReportPipeline::new(false, StepLogger::disabled())
            .with_index(&index)
            .with_tracker(&tracker)
            .with_notifier(&webex)
            .with_notifier(&slack);
        let err = pipeline.verify().expect_err("slack fails to verify");
        assert_eq!(err.to_string(), "failed to verify slack configuration");
        assert_eq!(err.collaborator_error().collaborator(), "slack");

        let pipeline = ReportPipeline::new(false, StepLogger::disabled())
            .with_index(&index)
            .with_tracker(&tracker)
            .with_notifier(&webex);
        pipeline.verify().expect("every collaborator verifies");
    }

    #[test]
    fn no_collaborators() {
        let pipeline = ReportPipeline::new(false, StepLogger::disabled());
        assert!(pipeline.has_no_collaborators());
        assert!(pipeline.open_issues().expect("no tracker").is_empty());
    }
}
