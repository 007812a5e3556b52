// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forwards the results of a finished Ginkgo test suite to Elasticsearch, Jira, Slack and Webex.
//!
//! Run `ginkgo --json-report=report.json`, then pass the report to `tracker-notifier report`.
//! Collaborators are configured through `$XDG_CONFIG_HOME/tracker-notifier/config.toml`,
//! `TRACKER_NOTIFIER_*` environment variables, or command-line flags.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, StderrStyles};
