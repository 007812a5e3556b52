// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-collaborator configuration sections.

use crate::errors::ConfigError;
use debug_ignore::DebugIgnore;
use serde::{Deserialize, Deserializer};
use url::Url;

/// The Slack Web API base URL used unless `api-url` is set.
pub const SLACK_DEFAULT_API_URL: &str = "https://slack.com/api/";

/// The Webex API base URL used unless `api-url` is set.
pub const WEBEX_DEFAULT_API_URL: &str = "https://webexapis.com/";

/// The search index that every test result is stored in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElasticConfig {
    /// The Elasticsearch base URL.
    pub url: Url,

    /// The index to store results in. Must already exist.
    pub index: String,
}

/// The issue tracker that failures are filed into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiraConfig {
    /// The Jira base URL.
    pub base_url: Url,

    /// The project key or id to file issues in.
    pub project: String,

    /// The name of the agile board whose active sprint issues are moved to.
    pub board: String,

    /// The component new issues are filed under, if any.
    pub component: Option<String>,

    /// The reporter whose open issues are searched for duplicates.
    pub username: String,

    /// The password or API token for `username`. Requests are anonymous if unset.
    pub password: Option<DebugIgnore<String>>,
}

/// A Slack channel that the failure summary is posted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackConfig {
    /// The bot token.
    pub auth_token: DebugIgnore<String>,

    /// The channel name, without the leading `#`.
    pub channel: String,

    /// The Web API base URL.
    pub api_url: Url,
}

/// A Webex room that the failure summary is posted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebexConfig {
    /// The bot token.
    pub auth_token: DebugIgnore<String>,

    /// The room title.
    pub room: String,

    /// The API base URL.
    pub api_url: Url,
}

/// The `[elastic]` section, with every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialElasticConfig {
    /// See [`ElasticConfig::url`].
    pub url: Option<String>,

    /// See [`ElasticConfig::index`].
    pub index: Option<String>,
}

impl PartialElasticConfig {
    const SECTION: &'static str = "elastic";

    pub(super) fn merge(self, overrides: Self) -> Self {
        Self {
            url: overrides.url.or(self.url),
            index: overrides.index.or(self.index),
        }
    }

    pub(super) fn resolve(self) -> Result<Option<ElasticConfig>, ConfigError> {
        if self.url.is_none() && self.index.is_none() {
            return Ok(None);
        }
        let url = required(Self::SECTION, "url", self.url)?;
        Ok(Some(ElasticConfig {
            url: parse_url(Self::SECTION, "url", url)?,
            index: required(Self::SECTION, "index", self.index)?,
        }))
    }
}

/// The `[jira]` section, with every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialJiraConfig {
    /// See [`JiraConfig::base_url`].
    pub base_url: Option<String>,

    /// See [`JiraConfig::project`].
    pub project: Option<String>,

    /// See [`JiraConfig::board`].
    pub board: Option<String>,

    /// See [`JiraConfig::component`].
    pub component: Option<String>,

    /// See [`JiraConfig::username`].
    pub username: Option<String>,

    /// See [`JiraConfig::password`].
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Option<DebugIgnore<String>>,
}

impl PartialJiraConfig {
    const SECTION: &'static str = "jira";

    pub(super) fn merge(self, overrides: Self) -> Self {
        Self {
            base_url: overrides.base_url.or(self.base_url),
            project: overrides.project.or(self.project),
            board: overrides.board.or(self.board),
            component: overrides.component.or(self.component),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
        }
    }

    pub(super) fn resolve(self) -> Result<Option<JiraConfig>, ConfigError> {
        if self.base_url.is_none()
            && self.project.is_none()
            && self.board.is_none()
            && self.username.is_none()
        {
            return Ok(None);
        }
        let base_url = required(Self::SECTION, "base-url", self.base_url)?;
        Ok(Some(JiraConfig {
            base_url: parse_url(Self::SECTION, "base-url", base_url)?,
            project: required(Self::SECTION, "project", self.project)?,
            board: required(Self::SECTION, "board", self.board)?,
            component: self.component.filter(|c| !c.is_empty()),
            username: required(Self::SECTION, "username", self.username)?,
            password: self.password.filter(|p| !p.is_empty()),
        }))
    }
}

/// The `[slack]` section, with every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialSlackConfig {
    /// See [`SlackConfig::auth_token`].
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub auth_token: Option<DebugIgnore<String>>,

    /// See [`SlackConfig::channel`].
    pub channel: Option<String>,

    /// See [`SlackConfig::api_url`].
    pub api_url: Option<String>,
}

impl PartialSlackConfig {
    const SECTION: &'static str = "slack";

    pub(super) fn merge(self, overrides: Self) -> Self {
        Self {
            auth_token: overrides.auth_token.or(self.auth_token),
            channel: overrides.channel.or(self.channel),
            api_url: overrides.api_url.or(self.api_url),
        }
    }

    pub(super) fn resolve(self) -> Result<Option<SlackConfig>, ConfigError> {
        if self.auth_token.is_none() && self.channel.is_none() {
            return Ok(None);
        }
        let api_url = self
            .api_url
            .unwrap_or_else(|| SLACK_DEFAULT_API_URL.to_owned());
        Ok(Some(SlackConfig {
            auth_token: required(Self::SECTION, "auth-token", self.auth_token)?,
            channel: required(Self::SECTION, "channel", self.channel)?,
            api_url: parse_url(Self::SECTION, "api-url", api_url)?,
        }))
    }
}

/// The `[webex]` section, with every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialWebexConfig {
    /// See [`WebexConfig::auth_token`].
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub auth_token: Option<DebugIgnore<String>>,

    /// See [`WebexConfig::room`].
    pub room: Option<String>,

    /// See [`WebexConfig::api_url`].
    pub api_url: Option<String>,
}

impl PartialWebexConfig {
    const SECTION: &'static str = "webex";

    pub(super) fn merge(self, overrides: Self) -> Self {
        Self {
            auth_token: overrides.auth_token.or(self.auth_token),
            room: overrides.room.or(self.room),
            api_url: overrides.api_url.or(self.api_url),
        }
    }

    pub(super) fn resolve(self) -> Result<Option<WebexConfig>, ConfigError> {
        if self.auth_token.is_none() && self.room.is_none() {
            return Ok(None);
        }
        let api_url = self
            .api_url
            .unwrap_or_else(|| WEBEX_DEFAULT_API_URL.to_owned());
        Ok(Some(WebexConfig {
            auth_token: required(Self::SECTION, "auth-token", self.auth_token)?,
            room: required(Self::SECTION, "room", self.room)?,
            api_url: parse_url(Self::SECTION, "api-url", api_url)?,
        }))
    }
}

fn required<T>(
    section: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingField { section, field })
}

fn parse_url(section: &'static str, field: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|err| ConfigError::InvalidUrl {
        section,
        field,
        value,
        err,
    })
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<DebugIgnore<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(DebugIgnore))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_are_disabled() {
        assert_eq!(PartialElasticConfig::default().resolve().expect("valid"), None);
        assert_eq!(PartialJiraConfig::default().resolve().expect("valid"), None);
        assert_eq!(PartialSlackConfig::default().resolve().expect("valid"), None);
        assert_eq!(PartialWebexConfig::default().resolve().expect("valid"), None);
    }

    #[test]
    fn optional_fields_alone_do_not_enable_a_section() {
        let jira = PartialJiraConfig {
            component: Some("networking".to_owned()),
            password: Some(DebugIgnore("hunter2".to_owned())),
            ..Default::default()
        };
        assert_eq!(jira.resolve().expect("valid"), None);

        let slack = PartialSlackConfig {
            api_url: Some("http://localhost:8080/api/".to_owned()),
            ..Default::default()
        };
        assert_eq!(slack.resolve().expect("valid"), None);
    }

    #[test]
    fn missing_required_field() {
        let jira = PartialJiraConfig {
            base_url: Some("https://jira.example.com".to_owned()),
            project: Some("E2E".to_owned()),
            username: Some("qa-bot".to_owned()),
            ..Default::default()
        };
        let err = jira.resolve().expect_err("board is missing");
        assert!(
            matches!(
                err,
                ConfigError::MissingField {
                    section: "jira",
                    field: "board"
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn invalid_url() {
        let elastic = PartialElasticConfig {
            url: Some("elastic.example.com".to_owned()),
            index: Some("e2e".to_owned()),
        };
        let err = elastic.resolve().expect_err("URL is invalid");
        assert!(
            matches!(err, ConfigError::InvalidUrl { section: "elastic", field: "url", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn default_api_urls() {
        let slack = PartialSlackConfig {
            auth_token: Some(DebugIgnore("xoxb-1".to_owned())),
            channel: Some("e2e-alerts".to_owned()),
            api_url: None,
        }
        .resolve()
        .expect("valid")
        .expect("enabled");
        assert_eq!(slack.api_url.as_str(), SLACK_DEFAULT_API_URL);

        let webex = PartialWebexConfig {
            auth_token: Some(DebugIgnore("token".to_owned())),
            room: Some("E2E alerts".to_owned()),
            api_url: None,
        }
        .resolve()
        .expect("valid")
        .expect("enabled");
        assert_eq!(webex.api_url.as_str(), WEBEX_DEFAULT_API_URL);
    }

    #[test]
    fn empty_optional_values_are_unset() {
        let jira = PartialJiraConfig {
            base_url: Some("https://jira.example.com".to_owned()),
            project: Some("E2E".to_owned()),
            board: Some("E2E board".to_owned()),
            component: Some(String::new()),
            username: Some("qa-bot".to_owned()),
            password: Some(DebugIgnore(String::new())),
        }
        .resolve()
        .expect("valid")
        .expect("enabled");
        assert_eq!(jira.component, None);
        assert_eq!(jira.password, None);
    }

    #[test]
    fn overrides_take_precedence() {
        let file = PartialWebexConfig {
            auth_token: Some(DebugIgnore("from-file".to_owned())),
            room: Some("E2E alerts".to_owned()),
            api_url: None,
        };
        let overrides = PartialWebexConfig {
            auth_token: Some(DebugIgnore("from-cli".to_owned())),
            ..Default::default()
        };
        let merged = file.merge(overrides);
        assert_eq!(
            merged.auth_token.as_ref().map(|t| t.as_str()),
            Some("from-cli")
        );
        assert_eq!(merged.room.as_deref(), Some("E2E alerts"));
    }
}
