// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to the suite reports consumed by `tracker-notifier`.
//!
//! A test framework run produces one machine-readable suite report per suite. This crate contains
//! the data model for those reports (as written by Ginkgo's `--json-report`), along with the
//! documented exit codes of the `tracker-notifier` binary.
//!
//! The model is read-only: `tracker-notifier` never writes suite reports back out.

mod errors;
mod exit_codes;
mod report;
#[cfg(feature = "proptest1")]
mod test_helpers;

pub use errors::*;
pub use exit_codes::*;
pub use report::*;
