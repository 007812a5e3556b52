// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `tracker-notifier`, which forwards the results of a finished test suite
//! to a search index, an issue tracker and chat rooms.
//!
//! The flow of a run:
//!
//! 1. [`config::NotifierConfig`] is loaded from the config file, the environment and command-line
//!    overrides, and decides which collaborators are enabled.
//! 2. The suite report written by the test framework is read with [`read_suite_reports`].
//! 3. A [`pipeline::ReportPipeline`] verifies every collaborator, then forwards each test report
//!    to them.
//!
//! The identity of a test ([`identity`]) and the matching of failures against open issues
//! ([`matcher`]) are pure functions, so that the same decisions are made in dry-run mode.

pub mod chat;
pub mod config;
pub mod elastic;
pub mod errors;
mod http;
pub mod identity;
pub mod jira;
pub mod matcher;
pub mod message;
pub mod pipeline;
mod report_file;
mod run_id;
pub mod step;

pub use report_file::read_suite_reports;
pub use run_id::RunId;
