// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;
use tracker_notifier_metadata::NotifierExitCode;
use tracker_notifier_runner::errors::{
    ConfigError, HttpError, JiraError, ReportReadError, VerifyError,
};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that is expected to happen in normal operation, with a defined exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config error")]
    Config {
        #[from]
        err: ConfigError,
    },
    #[error("failed to set up {collaborator} client")]
    ClientSetup {
        collaborator: &'static str,
        #[source]
        err: HttpError,
    },
    #[error("failed to read suite report")]
    ReportRead {
        #[from]
        err: ReportReadError,
    },
    #[error("verification failed")]
    Verify {
        #[from]
        err: VerifyError,
    },
    #[error("failed to fetch open issues")]
    OpenIssues {
        #[source]
        err: JiraError,
    },
    #[error("delivery incomplete")]
    DeliveryIncomplete { failures: usize },
    #[error("failed to write output")]
    WriteOutput {
        report_file: Option<Utf8PathBuf>,
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::ClientSetup { .. } | Self::OpenIssues { .. } => {
                NotifierExitCode::SETUP_ERROR
            }
            Self::ReportRead { .. } => NotifierExitCode::REPORT_READ_FAILED,
            Self::Verify { .. } => NotifierExitCode::VERIFY_FAILED,
            Self::DeliveryIncomplete { .. } => NotifierExitCode::DELIVERY_INCOMPLETE,
            Self::WriteOutput { .. } => NotifierExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::Config { err } => {
                error!("failed to load tracker-notifier configuration");
                Some(err as &dyn Error)
            }
            Self::ClientSetup { collaborator, err } => {
                error!(
                    "failed to set up {} client",
                    collaborator.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::ReportRead { err } => {
                // The error names the file.
                error!("{err}");
                err.source()
            }
            Self::Verify { err } => {
                error!("{err}");
                err.source()
            }
            Self::OpenIssues { err } => {
                error!("failed to fetch open issues from jira");
                Some(err as &dyn Error)
            }
            Self::DeliveryIncomplete { failures } => {
                error!(
                    "run completed, but {} {} failed (see warnings above)",
                    failures.style(styles.bold),
                    if *failures == 1 {
                        "collaborator call"
                    } else {
                        "collaborator calls"
                    },
                );
                None
            }
            Self::WriteOutput { report_file, err } => {
                match report_file {
                    Some(report_file) => error!(
                        "failed to write message for {}",
                        report_file.style(styles.bold)
                    ),
                    None => error!("failed to write output"),
                }
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
