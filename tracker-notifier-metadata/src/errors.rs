// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{error, fmt};

/// An error that occurs while parsing a suite report document.
#[derive(Debug)]
pub struct ReportParseError {
    path: String,
    inner: serde_json::Error,
}

impl ReportParseError {
    pub(crate) fn new(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self {
            path: err.path().to_string(),
            inner: err.into_inner(),
        }
    }

    /// Returns the JSON path at which parsing failed, e.g. `[0].SpecReports[3].RunTime`.
    ///
    /// The path is `.` if the error occurred at the top level.
    pub fn json_path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ReportParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to parse suite report at `{}`", self.path)
    }
}

impl error::Error for ReportParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.inner)
    }
}
