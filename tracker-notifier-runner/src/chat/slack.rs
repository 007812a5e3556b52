// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::ChatNotifier;
use crate::{
    config::SlackConfig,
    errors::{ChatError, HttpError},
    http::{HttpAuth, HttpClient},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// The number of channels requested per `conversations.list` page.
const CONVERSATIONS_PAGE_SIZE: &str = "50";

/// Posts messages to a Slack channel through the Web API.
#[derive(Clone, Debug)]
pub struct SlackClient {
    http: HttpClient,
    channel: String,
}

impl SlackClient {
    /// Creates a new client.
    pub fn new(config: &SlackConfig, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(
                config.api_url.clone(),
                timeout,
                HttpAuth::Bearer(config.auth_token.clone()),
            )?,
            channel: config.channel.trim_start_matches('#').to_owned(),
        })
    }

    /// Looks up the id of the configured channel, walking every page of non-archived channels.
    fn channel_id(&self) -> Result<String, ChatError> {
        let mut cursor = String::new();
        loop {
            let mut url = self.http.endpoint(["conversations.list"]);
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("exclude_archived", "true")
                    .append_pair("limit", CONVERSATIONS_PAGE_SIZE);
                if !cursor.is_empty() {
                    query.append_pair("cursor", &cursor);
                }
            }
            let page: ConversationsPage =
                check_ok("conversations.list", self.http.get_json(&url)?)?;

            if let Some(channel) = page.channels.into_iter().find(|c| c.name == self.channel) {
                debug!("slack channel {} has id {}", channel.name, channel.id);
                return Ok(channel.id);
            }

            match page.response_metadata {
                Some(ResponseMetadata { next_cursor }) if !next_cursor.is_empty() => {
                    cursor = next_cursor;
                }
                _ => {
                    return Err(ChatError::ChannelNotFound {
                        channel: self.channel.clone(),
                    });
                }
            }
        }
    }
}

impl ChatNotifier for SlackClient {
    fn name(&self) -> &str {
        "slack"
    }

    fn destination(&self) -> String {
        format!("slack channel {}", self.channel)
    }

    fn verify(&self) -> Result<(), ChatError> {
        let url = self.http.endpoint(["auth.test"]);
        let _: Empty = check_ok("auth.test", self.http.post_json(&url, &Empty {})?)?;
        self.channel_id().map(drop)
    }

    fn send(&self, text: &str) -> Result<(), ChatError> {
        let channel = self.channel_id()?;
        let url = self.http.endpoint(["chat.postMessage"]);
        let request = PostMessageRequest {
            channel: &channel,
            text,
        };
        let _: Empty = check_ok("chat.postMessage", self.http.post_json(&url, &request)?)?;
        Ok(())
    }
}

/// Every Web API response carries `ok`, and `error` when `ok` is false.
#[derive(Debug, Deserialize)]
struct SlackResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

fn check_ok<T>(method: &'static str, response: SlackResponse<T>) -> Result<T, ChatError> {
    if response.ok {
        Ok(response.body)
    } else {
        Err(ChatError::SlackApi {
            method,
            error: response.error.unwrap_or_else(|| "unknown_error".to_owned()),
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Empty {}

#[derive(Debug, Deserialize)]
struct ConversationsPage {
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}
