// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by tracker-notifier.

use camino::{FromPathBufError, Utf8PathBuf};
use std::fmt;
use thiserror::Error;
use tracker_notifier_metadata::ReportParseError;

/// An error that occurred while loading or validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file at `{path}`")]
    Read {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The configuration file could not be parsed as TOML.
    #[error("failed to parse config file at `{path}`")]
    Parse {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: Box<toml::de::Error>,
    },

    /// An explicitly specified configuration file does not exist.
    #[error("config file not found at `{path}`")]
    FileNotFound {
        /// The path that was specified.
        path: Utf8PathBuf,
    },

    /// The discovered configuration path was not valid UTF-8.
    #[error("config path is not valid UTF-8")]
    NonUtf8Path {
        /// The underlying error.
        #[source]
        error: FromPathBufError,
    },

    /// A section was partially filled in.
    #[error("[{section}] is missing required field `{field}`")]
    MissingField {
        /// The section name.
        section: &'static str,

        /// The missing field.
        field: &'static str,
    },

    /// A URL could not be parsed.
    #[error("[{section}] has an invalid URL for `{field}`: `{value}`")]
    InvalidUrl {
        /// The section name.
        section: &'static str,

        /// The field name.
        field: &'static str,

        /// The value that failed to parse.
        value: String,

        /// The underlying error.
        #[source]
        err: url::ParseError,
    },

    /// No run id was provided.
    #[error("a run id is required (pass --run-id or set `run-id` in the config file)")]
    MissingRunId,

    /// The run id was zero.
    #[error("run id must be non-zero")]
    ZeroRunId,
}

/// An error that occurred while reading a suite report file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportReadError {
    /// The file could not be read.
    #[error("failed to read suite report at `{path}`")]
    Read {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The file could not be parsed.
    #[error("failed to parse suite report at `{path}`")]
    Parse {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error, which carries the JSON path of the offending field.
        #[source]
        err: ReportParseError,
    },
}

/// An error that occurred while talking to a remote HTTP API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpError {
    /// The base URL cannot have path segments appended to it.
    #[error("`{url}` cannot be used as a base URL")]
    InvalidBaseUrl {
        /// The URL.
        url: String,
    },

    /// The request could not be sent, or the response could not be read.
    #[error("{method} {url} failed")]
    Transport {
        /// The HTTP method.
        method: &'static str,

        /// The request URL.
        url: String,

        /// The underlying error.
        #[source]
        err: Box<ureq::Error>,
    },

    /// The server responded with a non-success status.
    #[error("{method} {url} returned status {status}{}", BodyExcerpt(.body))]
    Status {
        /// The HTTP method.
        method: &'static str,

        /// The request URL.
        url: String,

        /// The response status.
        status: u16,

        /// The start of the response body.
        body: String,
    },

    /// The request body could not be serialized, or the response body could not be decoded.
    #[error("{method} {url}: failed to process JSON")]
    Json {
        /// The HTTP method.
        method: &'static str,

        /// The request URL.
        url: String,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },
}

impl HttpError {
    /// Returns the response status, if the server responded with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

struct BodyExcerpt<'a>(&'a str);

impl fmt::Display for BodyExcerpt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.0.trim();
        if body.is_empty() {
            Ok(())
        } else {
            write!(f, ": {body}")
        }
    }
}

/// An error returned by the search index.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ElasticError {
    /// The configured index does not exist.
    #[error("index `{index}` does not exist")]
    IndexMissing {
        /// The index name.
        index: String,
    },

    /// Checking for the index returned an unexpected status.
    #[error("checking index `{index}` returned status {status}")]
    UnexpectedStatus {
        /// The index name.
        index: String,

        /// The response status.
        status: u16,
    },

    /// Storing a record failed.
    #[error("failed to store record `{doc_id}`")]
    Store {
        /// The document id.
        doc_id: String,

        /// The underlying error.
        #[source]
        err: HttpError,
    },

    /// An HTTP error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// An error returned by the issue tracker.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JiraError {
    /// The project could not be fetched.
    #[error("failed to fetch project `{project}`")]
    Project {
        /// The configured project.
        project: String,

        /// The underlying error.
        #[source]
        err: HttpError,
    },

    /// Board lookup did not match exactly one board.
    #[error("expected exactly one board named `{board}` in project `{project_key}`, found {found}")]
    BoardNotUnique {
        /// The configured board.
        board: String,

        /// The project key searched.
        project_key: String,

        /// The number of boards found.
        found: usize,
    },

    /// No sprint is active on the board.
    #[error("no active sprint found on board `{board}`")]
    NoActiveSprint {
        /// The configured board.
        board: String,
    },

    /// Fetching the open issues failed.
    #[error("failed to fetch open issues")]
    Search(#[source] HttpError),

    /// Creating an issue failed.
    #[error("failed to create issue `{summary}`")]
    Create {
        /// The summary of the issue.
        summary: String,

        /// The underlying error.
        #[source]
        err: HttpError,
    },

    /// Adding a comment failed.
    #[error("failed to add comment to issue `{issue}`")]
    Comment {
        /// The issue key.
        issue: String,

        /// The underlying error.
        #[source]
        err: HttpError,
    },

    /// Moving an issue to the active sprint failed.
    #[error("failed to move issue `{issue}` to sprint `{sprint}`")]
    MoveToSprint {
        /// The issue key.
        issue: String,

        /// The sprint name.
        sprint: String,

        /// The underlying error.
        #[source]
        err: HttpError,
    },

    /// An HTTP error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// An error returned by a chat service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    /// The Slack Web API responded with `"ok": false`.
    #[error("Slack API method `{method}` failed: {error}")]
    SlackApi {
        /// The API method.
        method: &'static str,

        /// The `error` string from the response.
        error: String,
    },

    /// The configured Slack channel was not found.
    #[error("Slack channel `{channel}` not found")]
    ChannelNotFound {
        /// The configured channel.
        channel: String,
    },

    /// The configured Webex room was not found.
    #[error("Webex room `{room}` not found")]
    RoomNotFound {
        /// The configured room.
        room: String,
    },

    /// An HTTP error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// An error returned by one of the collaborators of a report run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollaboratorError {
    /// The search index failed.
    #[error("search index error")]
    Index(#[source] ElasticError),

    /// The issue tracker failed.
    #[error("issue tracker error")]
    Tracker(#[source] JiraError),

    /// A chat notifier failed.
    #[error("chat notifier `{notifier}` error")]
    Chat {
        /// The name of the notifier.
        notifier: String,

        /// The underlying error.
        #[source]
        err: ChatError,
    },
}

impl CollaboratorError {
    /// Returns a short name for the collaborator that failed.
    pub fn collaborator(&self) -> &str {
        match self {
            Self::Index(_) => "elastic",
            Self::Tracker(_) => "jira",
            Self::Chat { notifier, .. } => notifier,
        }
    }
}

/// An error that occurred while verifying collaborators before a run.
#[derive(Debug, Error)]
#[error("failed to verify {} configuration", .err.collaborator())]
pub struct VerifyError {
    #[source]
    err: CollaboratorError,
}

impl VerifyError {
    pub(crate) fn new(err: CollaboratorError) -> Self {
        Self { err }
    }

    /// Returns the underlying collaborator error.
    pub fn collaborator_error(&self) -> &CollaboratorError {
        &self.err
    }
}

/// Displays an error along with every error in its `source()` chain.
///
/// ```text
/// failed to verify slack configuration
///   caused by:
///   - chat notifier `slack` error
///   - Slack channel `e2e-alerts` not found
/// ```
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: std::error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: std::error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let Some(mut cause) = self.error.source() else {
            return Ok(());
        };
        write!(f, "\n  caused by:")?;
        loop {
            write!(f, "\n  - {cause}")?;
            match cause.source() {
                Some(next) => cause = next,
                None => return Ok(()),
            }
        }
    }
}
