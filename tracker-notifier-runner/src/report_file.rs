// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ReportReadError;
use camino::Utf8Path;
use tracing::debug;
use tracker_notifier_metadata::SuiteReports;

/// Reads the suite report document at `path`.
pub fn read_suite_reports(path: &Utf8Path) -> Result<SuiteReports, ReportReadError> {
    let contents = std::fs::read_to_string(path).map_err(|err| ReportReadError::Read {
        path: path.to_owned(),
        err,
    })?;
    let reports = SuiteReports::parse(&contents).map_err(|err| ReportReadError::Parse {
        path: path.to_owned(),
        err,
    })?;
    debug!(
        "read {} suites ({} test reports) from {path}",
        reports.suites().len(),
        reports.test_reports().count(),
    );
    Ok(reports)
}
