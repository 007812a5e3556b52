// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::ChatNotifier;
use crate::{
    config::WebexConfig,
    errors::{ChatError, HttpError},
    http::{HttpAuth, HttpClient},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The maximum number of rooms listed when looking up the configured room.
const MAX_ROOMS: &str = "200";

/// Posts markdown messages to a Webex room.
#[derive(Clone, Debug)]
pub struct WebexClient {
    http: HttpClient,
    room: String,
}

impl WebexClient {
    /// Creates a new client.
    pub fn new(config: &WebexConfig, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(
                config.api_url.clone(),
                timeout,
                HttpAuth::Bearer(config.auth_token.clone()),
            )?,
            room: config.room.clone(),
        })
    }

    fn room_id(&self) -> Result<String, ChatError> {
        let mut url = self.http.endpoint(["v1", "rooms"]);
        url.query_pairs_mut().append_pair("max", MAX_ROOMS);
        let rooms: RoomList = self.http.get_json(&url)?;
        find_room(rooms, &self.room).ok_or_else(|| ChatError::RoomNotFound {
            room: self.room.clone(),
        })
    }
}

impl ChatNotifier for WebexClient {
    fn name(&self) -> &str {
        "webex"
    }

    fn destination(&self) -> String {
        format!("webex room {}", self.room)
    }

    fn verify(&self) -> Result<(), ChatError> {
        self.room_id().map(drop)
    }

    fn send(&self, text: &str) -> Result<(), ChatError> {
        let room_id = self.room_id()?;
        let url = self.http.endpoint(["v1", "messages"]);
        let request = CreateMessageRequest {
            room_id: &room_id,
            markdown: text,
        };
        self.http.post_json_discard(&url, &request)?;
        Ok(())
    }
}

fn find_room(rooms: RoomList, title: &str) -> Option<String> {
    rooms
        .items
        .into_iter()
        .find(|room| room.title == title)
        .map(|room| room.id)
}

#[derive(Debug, Deserialize)]
struct RoomList {
    #[serde(default)]
    items: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct Room {
    id: String,
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessageRequest<'a> {
    room_id: &'a str,
    markdown: &'a str,
}
