// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The search index collaborator: one Elasticsearch document per test per run.

use crate::{
    RunId,
    config::ElasticConfig,
    errors::{ElasticError, HttpError},
    http::{HttpAuth, HttpClient},
    identity::{is_serial, resolve_maintainer, resolve_name, resolve_summary},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::time::Duration;
use tracker_notifier_metadata::TestReport;

/// A search index that test results are written to.
pub trait IndexWriter {
    /// Checks that the index exists.
    fn verify(&self) -> Result<(), ElasticError>;

    /// Stores `record` under `doc_id`, replacing any previous document with that id.
    fn store(&self, doc_id: &str, record: &IndexRecord) -> Result<(), ElasticError>;
}

/// The document stored for each test.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    /// The canonical test name.
    pub name: String,

    /// The test summary. Search results are matched to tracker issues through it.
    pub description: String,

    /// The maintainer of the test, possibly empty.
    pub maintainer: String,

    /// How long the test ran, in minutes.
    pub duration_in_minutes: f64,

    /// How long the test ran, rounded to the nearest second.
    pub duration_in_seconds: u64,

    /// The final state of the test.
    pub result: String,

    /// The run id.
    pub run: u64,

    /// When the test started.
    pub start_time: Option<DateTime<FixedOffset>>,

    /// Whether the test ran serially.
    pub serial: bool,
}

impl IndexRecord {
    /// Builds the record for `report`.
    pub fn new(report: &TestReport, run_id: RunId) -> Self {
        Self {
            name: resolve_name(report),
            description: resolve_summary(report).to_owned(),
            maintainer: resolve_maintainer(report).to_owned(),
            duration_in_minutes: report.run_time.as_secs_f64() / 60.0,
            duration_in_seconds: rounded_seconds(report.run_time),
            result: report.state.as_str().to_owned(),
            run: run_id.get(),
            start_time: report.start_time,
            serial: is_serial(report),
        }
    }
}

/// Returns the id of the document for `test_name` in `run_id`: `run_<run id>_test_<test name>`.
///
/// Storing a run twice overwrites its documents instead of duplicating them.
pub fn index_doc_id(run_id: RunId, test_name: &str) -> String {
    format!("run_{run_id}_test_{}", test_name.trim())
}

fn rounded_seconds(duration: Duration) -> u64 {
    let seconds = (duration.as_nanos() + 500_000_000) / 1_000_000_000;
    u64::try_from(seconds).unwrap_or(u64::MAX)
}

/// An Elasticsearch client.
#[derive(Clone, Debug)]
pub struct ElasticClient {
    http: HttpClient,
    index: String,
}

impl ElasticClient {
    /// Creates a new client.
    pub fn new(config: &ElasticConfig, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(config.url.clone(), timeout, HttpAuth::Anonymous)?,
            index: config.index.clone(),
        })
    }
}

impl IndexWriter for ElasticClient {
    fn verify(&self) -> Result<(), ElasticError> {
        let url = self.http.endpoint([self.index.as_str()]);
        match self.http.head(&url)? {
            200 => Ok(()),
            404 => Err(ElasticError::IndexMissing {
                index: self.index.clone(),
            }),
            status => Err(ElasticError::UnexpectedStatus {
                index: self.index.clone(),
                status,
            }),
        }
    }

    fn store(&self, doc_id: &str, record: &IndexRecord) -> Result<(), ElasticError> {
        let url = self.http.endpoint([self.index.as_str(), "_doc", doc_id]);
        self.http
            .put_json(&url, record)
            .map_err(|err| ElasticError::Store {
                doc_id: doc_id.to_owned(),
                err,
            })
    }
}
