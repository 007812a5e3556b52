// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use debug_ignore::DebugIgnore;
use std::{convert::Infallible, io::Write, time::Duration};
use tracing::{info, warn};
use tracker_notifier_metadata::NotifierExitCode;
use tracker_notifier_runner::{
    chat::{SlackClient, WebexClient},
    config::{
        NotifierConfig, NotifierConfigLocation, PartialConfig, PartialElasticConfig,
        PartialJiraConfig, PartialSlackConfig, PartialWebexConfig,
    },
    elastic::ElasticClient,
    errors::HttpError,
    jira::JiraClient,
    message::prepare_message,
    pipeline::ReportPipeline,
    read_suite_reports,
    step::StepLogger,
};

/// Forwards the results of a finished Ginkgo test suite to Elasticsearch, Jira, Slack and Webex.
///
/// Every test result is stored in an Elasticsearch index. Failures are filed as Jira issues, or
/// commented on if an open issue already tracks them, and a summary is posted to Slack and Webex.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct TrackerNotifierApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    config_opts: ConfigOpts,

    #[clap(subcommand)]
    command: Command,
}

impl TrackerNotifierApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, writing command output to `stdout`.
    ///
    /// Returns the exit code of the process.
    pub fn exec(self, output: OutputContext, stdout: &mut dyn Write) -> Result<i32> {
        let mut overrides = self.config_opts.partial_config();
        if output.verbose {
            overrides.enable_logs = Some(true);
        }

        match self.command {
            Command::Report(opts) => {
                if opts.dry_run {
                    overrides.dry_run = Some(true);
                }
                let config = self.config_opts.load(opts.run.apply(overrides))?;
                opts.exec(&config)
            }
            Command::Verify => {
                let config = self.config_opts.load(overrides)?;
                exec_verify(&config)
            }
            Command::ShowMessage(opts) => {
                let config = self.config_opts.load(opts.run.apply(overrides))?;
                opts.exec(&config, stdout)
            }
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the configured collaborators, then forward a suite report to them
    Report(ReportOpts),

    /// Verify the configured collaborators, without reading a suite report
    ///
    /// Checks that the Elasticsearch index exists, that the Slack channel and Webex room can be
    /// found, and that the Jira project, board and active sprint resolve.
    Verify,

    /// Print the chat message that a suite report would produce
    ///
    /// If Jira is configured, open issues are fetched to point each failure at its issue. Nothing
    /// is written to any collaborator.
    ShowMessage(ShowMessageOpts),
}

#[derive(Debug, Args)]
struct RunOpts {
    /// The id of the CI run the report belongs to
    #[arg(long, value_name = "N", env = "TRACKER_NOTIFIER_RUN_ID")]
    run_id: Option<u64>,
}

impl RunOpts {
    fn apply(&self, mut overrides: PartialConfig) -> PartialConfig {
        if self.run_id.is_some() {
            overrides.run_id = self.run_id;
        }
        overrides
    }
}

#[derive(Debug, Args)]
struct ReportOpts {
    /// The suite report written by `ginkgo --json-report`
    #[arg(value_name = "REPORT_FILE")]
    report_file: Utf8PathBuf,

    #[clap(flatten)]
    run: RunOpts,

    /// Decide and log everything, but write nothing to any collaborator
    #[arg(long, env = "TRACKER_NOTIFIER_DRY_RUN")]
    dry_run: bool,
}

impl ReportOpts {
    fn exec(self, config: &NotifierConfig) -> Result<i32> {
        let run_id = config.require_run_id()?;
        let dry_run = config.dry_run;
        let steps = config.step_logger();

        let reports = read_suite_reports(&self.report_file)?.into_test_reports();
        let collaborators = Collaborators::new(config, steps)?;
        let pipeline = collaborators.pipeline(dry_run, steps);
        if pipeline.has_no_collaborators() {
            warn!("no collaborators are configured, so results will not be sent anywhere");
        }

        pipeline.verify()?;
        let outcome = pipeline.run(run_id, &reports);

        info!(
            "run {run_id}{}: {} results stored, {} issues updated, {} notifications sent",
            if dry_run { " (dry run)" } else { "" },
            outcome.records_stored,
            outcome.issue_actions.len(),
            outcome.notifications_sent,
        );

        if outcome.is_complete() {
            Ok(NotifierExitCode::OK)
        } else {
            Err(ExpectedError::DeliveryIncomplete {
                failures: outcome.failures.len(),
            })
        }
    }
}

#[derive(Debug, Args)]
struct ShowMessageOpts {
    /// The suite report written by `ginkgo --json-report`
    #[arg(value_name = "REPORT_FILE")]
    report_file: Utf8PathBuf,

    #[clap(flatten)]
    run: RunOpts,
}

impl ShowMessageOpts {
    fn exec(self, config: &NotifierConfig, stdout: &mut dyn Write) -> Result<i32> {
        let run_id = config.require_run_id()?;
        let steps = config.step_logger();

        let reports = read_suite_reports(&self.report_file)?.into_test_reports();
        let collaborators = Collaborators::new(config, steps)?;
        let open_issues = collaborators
            .pipeline(true, steps)
            .open_issues()
            .map_err(|err| ExpectedError::OpenIssues { err })?;

        let message = prepare_message(&reports, run_id, &open_issues);
        if message.is_empty() {
            info!("no failed tests in {}", self.report_file);
            return Ok(NotifierExitCode::OK);
        }

        stdout
            .write_all(message.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| ExpectedError::WriteOutput {
                report_file: Some(self.report_file),
                err,
            })?;
        Ok(NotifierExitCode::OK)
    }
}

fn exec_verify(config: &NotifierConfig) -> Result<i32> {
    let steps = config.step_logger();
    let collaborators = Collaborators::new(config, steps)?;
    let pipeline = collaborators.pipeline(false, steps);
    if pipeline.has_no_collaborators() {
        warn!("no collaborators are configured, nothing to verify");
        return Ok(NotifierExitCode::OK);
    }

    pipeline.verify()?;
    info!("verified {} configured collaborators", collaborators.len());
    Ok(NotifierExitCode::OK)
}

/// The clients for every configured collaborator.
#[derive(Debug)]
struct Collaborators {
    elastic: Option<ElasticClient>,
    jira: Option<JiraClient>,
    webex: Option<WebexClient>,
    slack: Option<SlackClient>,
}

impl Collaborators {
    fn new(config: &NotifierConfig, steps: StepLogger) -> Result<Self> {
        let timeout = config.http_timeout;

        Ok(Self {
            elastic: config
                .elastic
                .as_ref()
                .map(|elastic| ElasticClient::new(elastic, timeout))
                .transpose()
                .map_err(setup_error("elastic"))?,
            jira: config
                .jira
                .as_ref()
                .map(|jira| JiraClient::new(jira, timeout, steps))
                .transpose()
                .map_err(setup_error("jira"))?,
            webex: config
                .webex
                .as_ref()
                .map(|webex| WebexClient::new(webex, timeout))
                .transpose()
                .map_err(setup_error("webex"))?,
            slack: config
                .slack
                .as_ref()
                .map(|slack| SlackClient::new(slack, timeout))
                .transpose()
                .map_err(setup_error("slack"))?,
        })
    }

    fn len(&self) -> usize {
        usize::from(self.elastic.is_some())
            + usize::from(self.jira.is_some())
            + usize::from(self.webex.is_some())
            + usize::from(self.slack.is_some())
    }

    /// Returns a pipeline over these clients. Webex is notified before Slack.
    fn pipeline(&self, dry_run: bool, steps: StepLogger) -> ReportPipeline<'_> {
        let mut pipeline = ReportPipeline::new(dry_run, steps);
        if let Some(elastic) = &self.elastic {
            pipeline = pipeline.with_index(elastic);
        }
        if let Some(jira) = &self.jira {
            pipeline = pipeline.with_tracker(jira);
        }
        if let Some(webex) = &self.webex {
            pipeline = pipeline.with_notifier(webex);
        }
        if let Some(slack) = &self.slack {
            pipeline = pipeline.with_notifier(slack);
        }
        pipeline
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: $XDG_CONFIG_HOME/tracker-notifier/config.toml]
    ///
    /// Pass `none` to skip loading a config file.
    #[arg(long, global = true, value_name = "PATH", env = "TRACKER_NOTIFIER_CONFIG")]
    config: Option<String>,

    /// Timeout for each HTTP request, e.g. `30s` or `2m` [default: 30s]
    #[arg(
        long,
        global = true,
        value_name = "DURATION",
        value_parser = parse_duration,
        env = "TRACKER_NOTIFIER_HTTP_TIMEOUT"
    )]
    http_timeout: Option<Duration>,

    #[clap(flatten)]
    elastic: ElasticOpts,

    #[clap(flatten)]
    jira: JiraOpts,

    #[clap(flatten)]
    slack: SlackOpts,

    #[clap(flatten)]
    webex: WebexOpts,
}

impl ConfigOpts {
    fn load(&self, overrides: PartialConfig) -> Result<NotifierConfig> {
        let location = NotifierConfigLocation::from_cli_or_env(self.config.as_deref());
        Ok(NotifierConfig::load(location, overrides)?)
    }

    fn partial_config(&self) -> PartialConfig {
        PartialConfig {
            http_timeout: self.http_timeout,
            elastic: PartialElasticConfig {
                url: self.elastic.elastic_url.clone(),
                index: self.elastic.elastic_index.clone(),
            },
            jira: PartialJiraConfig {
                base_url: self.jira.jira_base_url.clone(),
                project: self.jira.jira_project.clone(),
                board: self.jira.jira_board.clone(),
                component: self.jira.jira_component.clone(),
                username: self.jira.jira_username.clone(),
                password: self.jira.jira_password.clone(),
            },
            slack: PartialSlackConfig {
                auth_token: self.slack.slack_auth_token.clone(),
                channel: self.slack.slack_channel.clone(),
                api_url: self.slack.slack_api_url.clone(),
            },
            webex: PartialWebexConfig {
                auth_token: self.webex.webex_auth_token.clone(),
                room: self.webex.webex_room.clone(),
                api_url: self.webex.webex_api_url.clone(),
            },
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Elasticsearch options")]
struct ElasticOpts {
    /// Elasticsearch base URL
    #[arg(long, global = true, value_name = "URL", env = "TRACKER_NOTIFIER_ELASTIC_URL")]
    elastic_url: Option<String>,

    /// Index to store results in
    #[arg(long, global = true, value_name = "INDEX", env = "TRACKER_NOTIFIER_ELASTIC_INDEX")]
    elastic_index: Option<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Jira options")]
struct JiraOpts {
    /// Jira base URL
    #[arg(long, global = true, value_name = "URL", env = "TRACKER_NOTIFIER_JIRA_BASE_URL")]
    jira_base_url: Option<String>,

    /// Project key or id to file issues in
    #[arg(long, global = true, value_name = "PROJECT", env = "TRACKER_NOTIFIER_JIRA_PROJECT")]
    jira_project: Option<String>,

    /// Agile board whose active sprint issues are moved to
    #[arg(long, global = true, value_name = "BOARD", env = "TRACKER_NOTIFIER_JIRA_BOARD")]
    jira_board: Option<String>,

    /// Component to file new issues under
    #[arg(
        long,
        global = true,
        value_name = "COMPONENT",
        env = "TRACKER_NOTIFIER_JIRA_COMPONENT"
    )]
    jira_component: Option<String>,

    /// Reporter of filed issues, used to find open issues
    #[arg(long, global = true, value_name = "USER", env = "TRACKER_NOTIFIER_JIRA_USERNAME")]
    jira_username: Option<String>,

    /// Password or API token of the reporter
    #[arg(
        long,
        global = true,
        value_name = "PASSWORD",
        value_parser = parse_secret,
        env = "TRACKER_NOTIFIER_JIRA_PASSWORD",
        hide_env_values = true
    )]
    jira_password: Option<DebugIgnore<String>>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Slack options")]
struct SlackOpts {
    /// Slack bot token
    #[arg(
        long,
        global = true,
        value_name = "TOKEN",
        value_parser = parse_secret,
        env = "TRACKER_NOTIFIER_SLACK_AUTH_TOKEN",
        hide_env_values = true
    )]
    slack_auth_token: Option<DebugIgnore<String>>,

    /// Channel to post failures to
    #[arg(long, global = true, value_name = "CHANNEL", env = "TRACKER_NOTIFIER_SLACK_CHANNEL")]
    slack_channel: Option<String>,

    /// Slack Web API base URL [default: https://slack.com/api/]
    #[arg(long, global = true, value_name = "URL", env = "TRACKER_NOTIFIER_SLACK_API_URL")]
    slack_api_url: Option<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Webex options")]
struct WebexOpts {
    /// Webex bot token
    #[arg(
        long,
        global = true,
        value_name = "TOKEN",
        value_parser = parse_secret,
        env = "TRACKER_NOTIFIER_WEBEX_AUTH_TOKEN",
        hide_env_values = true
    )]
    webex_auth_token: Option<DebugIgnore<String>>,

    /// Title of the room to post failures to
    #[arg(long, global = true, value_name = "ROOM", env = "TRACKER_NOTIFIER_WEBEX_ROOM")]
    webex_room: Option<String>,

    /// Webex API base URL [default: https://webexapis.com/]
    #[arg(long, global = true, value_name = "URL", env = "TRACKER_NOTIFIER_WEBEX_API_URL")]
    webex_api_url: Option<String>,
}

fn setup_error(collaborator: &'static str) -> impl FnOnce(HttpError) -> ExpectedError {
    move |err| ExpectedError::ClientSetup { collaborator, err }
}

fn parse_duration(s: &str) -> Result<Duration, humantime_serde::re::humantime::DurationError> {
    humantime_serde::re::humantime::parse_duration(s)
}

fn parse_secret(s: &str) -> Result<DebugIgnore<String>, Infallible> {
    Ok(DebugIgnore(s.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::tempdir;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const FAILED_REPORT: &str = r#"[{
        "SuiteDescription": "E2E Suite",
        "SpecReports": [
            {
                "ContainerHierarchyTexts": ["Verify list methods"],
                "LeafNodeType": "It",
                "LeafNodeText": "return ordered list",
                "State": "failed",
                "ParallelProcess": 1
            },
            {"LeafNodeType": "It", "LeafNodeText": "creates cluster", "State": "passed"}
        ]
    }]"#;

    fn parse(args: &[&str]) -> TrackerNotifierApp {
        let args = std::iter::once("tracker-notifier").chain(args.iter().copied());
        TrackerNotifierApp::try_parse_from(args).expect("arguments are valid")
    }

    fn output() -> OutputContext {
        OutputContext {
            verbose: false,
            color: crate::output::Color::Never,
        }
    }

    #[test]
    fn verify_app() {
        TrackerNotifierApp::command().debug_assert();
    }

    #[test]
    fn collaborator_flags_become_overrides() {
        let app = parse(&[
            "verify",
            "--elastic-url",
            "http://localhost:9200",
            "--elastic-index",
            "e2e",
            "--jira-password",
            "hunter2",
            "--slack-channel",
            "e2e-alerts",
            "--http-timeout",
            "1m 30s",
        ]);
        let partial = app.config_opts.partial_config();
        assert_eq!(partial.elastic.url.as_deref(), Some("http://localhost:9200"));
        assert_eq!(partial.elastic.index.as_deref(), Some("e2e"));
        assert_eq!(
            partial.jira.password.as_ref().map(|p| p.as_str()),
            Some("hunter2")
        );
        assert_eq!(partial.slack.channel.as_deref(), Some("e2e-alerts"));
        assert_eq!(partial.http_timeout, Some(Duration::from_secs(90)));
        assert_eq!(partial.run_id, None);
    }

    #[test]
    fn secrets_are_hidden_from_debug_output() {
        let app = parse(&["verify", "--slack-auth-token", "xoxb-secret"]);
        assert!(!format!("{app:?}").contains("xoxb-secret"));
    }

    #[test_case(&["report", "report.json", "--run-id", "1623"], Some(1623) ; "report")]
    #[test_case(&["show-message", "report.json", "--run-id", "7"], Some(7) ; "show message")]
    #[test_case(&["show-message", "report.json"], None ; "no run id")]
    fn run_id_flag(args: &[&str], expected: Option<u64>) {
        let app = parse(args);
        let run = match &app.command {
            Command::Report(opts) => &opts.run,
            Command::ShowMessage(opts) => &opts.run,
            Command::Verify => panic!("unexpected command"),
        };
        assert_eq!(run.apply(PartialConfig::default()).run_id, expected);
    }

    #[test]
    fn show_message_without_tracker() {
        let temp_dir = tempdir().expect("tempdir created");
        let report_file = temp_dir.path().join("report.json");
        std::fs::write(&report_file, FAILED_REPORT).expect("report written");

        let app = parse(&[
            "--config",
            "none",
            "show-message",
            report_file.as_str(),
            "--run-id",
            "1623",
        ]);
        let mut stdout = Vec::new();
        let code = app.exec(output(), &mut stdout).expect("message is shown");
        assert_eq!(code, NotifierExitCode::OK);
        assert_eq!(
            String::from_utf8(stdout).expect("message is UTF-8"),
            "Test: \"Verify list methods return ordered list\" failed in run 1623   \n"
        );
    }

    #[test]
    fn dry_run_report_without_collaborators() {
        let temp_dir = tempdir().expect("tempdir created");
        let report_file = temp_dir.path().join("report.json");
        std::fs::write(&report_file, FAILED_REPORT).expect("report written");

        let app = parse(&[
            "--config",
            "none",
            "report",
            report_file.as_str(),
            "--run-id",
            "1623",
            "--dry-run",
        ]);
        let code = app.exec(output(), &mut Vec::new()).expect("run succeeds");
        assert_eq!(code, NotifierExitCode::OK);
    }

    #[test]
    fn report_errors() {
        let temp_dir = tempdir().expect("tempdir created");
        let missing = temp_dir.path().join("missing.json");

        let app = parse(&["--config", "none", "report", missing.as_str()]);
        let err = app
            .exec(output(), &mut Vec::new())
            .expect_err("run id is missing");
        assert_eq!(err.process_exit_code(), NotifierExitCode::SETUP_ERROR);

        let app = parse(&["--config", "none", "report", missing.as_str(), "--run-id", "3"]);
        let err = app
            .exec(output(), &mut Vec::new())
            .expect_err("report file is missing");
        assert_eq!(err.process_exit_code(), NotifierExitCode::REPORT_READ_FAILED);
    }
}
