// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    discovery::default_config_path,
    elements::{
        ElasticConfig, JiraConfig, PartialElasticConfig, PartialJiraConfig, PartialSlackConfig,
        PartialWebexConfig, SlackConfig, WebexConfig,
    },
};
use crate::{RunId, errors::ConfigError, step::StepLogger};
use camino::Utf8Path;
use itertools::Itertools;
use serde::Deserialize;
use std::{collections::BTreeSet, io, time::Duration};
use tracing::{debug, warn};

/// Special value for `--config` and `TRACKER_NOTIFIER_CONFIG` that skips loading the config file.
pub const CONFIG_NONE: &str = "none";

/// The default timeout for each HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Specifies where to load configuration from.
#[derive(Clone, Copy, Debug)]
pub enum NotifierConfigLocation<'a> {
    /// Discover the config file at the default location.
    Default,

    /// Skip the config file, using only overrides and built-in defaults.
    Isolated,

    /// Load the config file from an explicit path.
    ///
    /// Returns an error if the file does not exist.
    Explicit(&'a Utf8Path),
}

impl<'a> NotifierConfigLocation<'a> {
    /// Creates a config location from a CLI or environment variable value.
    ///
    /// Returns `Default` if `None`, `Isolated` if `"none"`, otherwise `Explicit` with the path.
    pub fn from_cli_or_env(s: Option<&'a str>) -> Self {
        match s {
            None => Self::Default,
            Some(s) if s == CONFIG_NONE => Self::Isolated,
            Some(s) => Self::Explicit(Utf8Path::new(s)),
        }
    }
}

/// Configuration with every field optional, as read from the config file or assembled from
/// command-line arguments.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialConfig {
    /// The id of the run being reported. Must be non-zero.
    pub run_id: Option<u64>,

    /// Whether to skip every mutating call.
    pub dry_run: Option<bool>,

    /// Whether to log each step of a run.
    pub enable_logs: Option<bool>,

    /// The timeout for each HTTP request.
    #[serde(default, with = "humantime_serde")]
    pub http_timeout: Option<Duration>,

    /// The `[elastic]` section.
    #[serde(default)]
    pub elastic: PartialElasticConfig,

    /// The `[jira]` section.
    #[serde(default)]
    pub jira: PartialJiraConfig,

    /// The `[slack]` section.
    #[serde(default)]
    pub slack: PartialSlackConfig,

    /// The `[webex]` section.
    #[serde(default)]
    pub webex: PartialWebexConfig,
}

impl PartialConfig {
    /// Layers `overrides` on top of `self`: every value set in `overrides` wins.
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            run_id: overrides.run_id.or(self.run_id),
            dry_run: overrides.dry_run.or(self.dry_run),
            enable_logs: overrides.enable_logs.or(self.enable_logs),
            http_timeout: overrides.http_timeout.or(self.http_timeout),
            elastic: self.elastic.merge(overrides.elastic),
            jira: self.jira.merge(overrides.jira),
            slack: self.slack.merge(overrides.slack),
            webex: self.webex.merge(overrides.webex),
        }
    }

    /// Loads the config file from `path` with custom warning handling.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<Self>, ConfigError> {
        debug!("config: attempting to load from {path}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("config: file does not exist at {path}");
                return Ok(None);
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    err,
                });
            }
        };

        let (config, unknown) =
            Self::deserialize_toml(&contents).map_err(|err| ConfigError::Parse {
                path: path.to_owned(),
                err: Box::new(err),
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("config: loaded successfully from {path}");
        Ok(Some(config))
    }

    /// Deserializes TOML content and returns the config along with any unknown keys.
    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: PartialConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }

    fn from_location_with_warnings(
        location: NotifierConfigLocation<'_>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<Self>, ConfigError> {
        match location {
            NotifierConfigLocation::Isolated => {
                debug!("config: skipping (isolated)");
                Ok(None)
            }
            NotifierConfigLocation::Explicit(path) => {
                debug!("config: loading from explicit path {path}");
                match Self::from_path_with_warnings(path, warnings)? {
                    Some(config) => Ok(Some(config)),
                    None => Err(ConfigError::FileNotFound {
                        path: path.to_owned(),
                    }),
                }
            }
            NotifierConfigLocation::Default => match default_config_path()? {
                Some(path) => Self::from_path_with_warnings(&path, warnings),
                None => {
                    debug!("config: could not determine config directory");
                    Ok(None)
                }
            },
        }
    }
}

/// Configuration after the config file and overrides have been combined and validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    /// The id of the run being reported, if set.
    pub run_id: Option<RunId>,

    /// Whether to skip every mutating call.
    pub dry_run: bool,

    /// Whether to log each step of a run.
    pub enable_logs: bool,

    /// The timeout for each HTTP request.
    pub http_timeout: Duration,

    /// The search index, if configured.
    pub elastic: Option<ElasticConfig>,

    /// The issue tracker, if configured.
    pub jira: Option<JiraConfig>,

    /// The Slack channel, if configured.
    pub slack: Option<SlackConfig>,

    /// The Webex room, if configured.
    pub webex: Option<WebexConfig>,
}

impl NotifierConfig {
    /// Loads the config file from `location`, layers `overrides` on top, and validates the
    /// result.
    pub fn load(
        location: NotifierConfigLocation<'_>,
        overrides: PartialConfig,
    ) -> Result<Self, ConfigError> {
        Self::load_with_warnings(location, overrides, &mut DefaultConfigWarnings)
    }

    fn load_with_warnings(
        location: NotifierConfigLocation<'_>,
        overrides: PartialConfig,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigError> {
        let file_config =
            PartialConfig::from_location_with_warnings(location, warnings)?.unwrap_or_default();
        Self::resolve(file_config.merge(overrides))
    }

    /// Validates a fully merged partial config.
    pub fn resolve(partial: PartialConfig) -> Result<Self, ConfigError> {
        let run_id = partial
            .run_id
            .map(|id| RunId::new(id).ok_or(ConfigError::ZeroRunId))
            .transpose()?;

        Ok(Self {
            run_id,
            dry_run: partial.dry_run.unwrap_or(false),
            enable_logs: partial.enable_logs.unwrap_or(false),
            http_timeout: partial.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT),
            elastic: partial.elastic.resolve()?,
            jira: partial.jira.resolve()?,
            slack: partial.slack.resolve()?,
            webex: partial.webex.resolve()?,
        })
    }

    /// Returns the run id, or an error if none was configured.
    pub fn require_run_id(&self) -> Result<RunId, ConfigError> {
        self.run_id.ok_or(ConfigError::MissingRunId)
    }

    /// Returns the step logger for this configuration. Dry runs always log steps.
    pub fn step_logger(&self) -> StepLogger {
        StepLogger::new(self.enable_logs || self.dry_run)
    }

    /// Returns true if no collaborator is configured.
    pub fn has_no_collaborators(&self) -> bool {
        self.elastic.is_none() && self.jira.is_none() && self.slack.is_none() && self.webex.is_none()
    }
}

/// Trait for handling configuration warnings.
///
/// This allows warnings to be logged normally, or collected in tests.
trait ConfigWarnings {
    /// Handle unknown configuration keys found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs configuration warnings using tracing.
struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let unknown_str = match unknown.first() {
            // Print this on the same line.
            Some(key) if unknown.len() == 1 => format!("key: {key}"),
            _ => format!(
                "keys:\n{}",
                unknown
                    .iter()
                    .format_with("", |key, f| f(&format_args!("\n  - {key}")))
            ),
        };

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}
