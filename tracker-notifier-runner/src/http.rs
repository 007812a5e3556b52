// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small blocking JSON-over-HTTP client shared by the collaborator clients.

use crate::errors::HttpError;
use base64::{Engine, engine::general_purpose::STANDARD};
use debug_ignore::DebugIgnore;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;
use ureq::{Agent, Body, RequestBuilder, http::Response, typestate::WithBody};
use url::Url;

const USER_AGENT: &str = concat!("tracker-notifier/", env!("CARGO_PKG_VERSION"));

/// The maximum number of characters of an error response body kept in errors.
const BODY_EXCERPT_LEN: usize = 512;

/// How a client authenticates to a remote API.
#[derive(Clone, Debug)]
pub(crate) enum HttpAuth {
    Anonymous,
    Basic {
        username: String,
        password: DebugIgnore<String>,
    },
    Bearer(DebugIgnore<String>),
}

impl HttpAuth {
    fn header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{username}:{}", password.0))
            )),
            Self::Bearer(token) => Some(format!("Bearer {}", token.0)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Method {
    Head,
    Get,
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HttpClient {
    agent: DebugIgnore<Agent>,
    base_url: Url,
    authorization: DebugIgnore<Option<String>>,
}

impl HttpClient {
    pub(crate) fn new(base_url: Url, timeout: Duration, auth: HttpAuth) -> Result<Self, HttpError> {
        if base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidBaseUrl {
                url: base_url.into(),
            });
        }

        // Another provider may already be installed by the embedding process.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Ok(Self {
            agent: DebugIgnore(Agent::new_with_config(config)),
            base_url,
            authorization: DebugIgnore(auth.header_value()),
        })
    }

    /// Returns the base URL with `segments` appended, each percent-encoded as a single segment.
    pub(crate) fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        // Checked in new().
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Issues a HEAD request and returns the response status.
    pub(crate) fn head(&self, url: &Url) -> Result<u16, HttpError> {
        debug!("HEAD {url}");
        let response = self
            .prepare(self.agent.head(url.as_str()))
            .call()
            .map_err(|err| transport_error(Method::Head, url, err))?;
        Ok(response.status().as_u16())
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, HttpError> {
        debug!("GET {url}");
        let response = self
            .prepare(self.agent.get(url.as_str()))
            .header("Accept", "application/json")
            .call();
        let text = read_response(Method::Get, url, response)?;
        decode(Method::Get, url, &text)
    }

    pub(crate) fn post_json<B, T>(&self, url: &Url, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send_json(Method::Post, self.agent.post(url.as_str()), url, body)?;
        decode(Method::Post, url, &text)
    }

    /// Posts `body` and ignores the response body, which may be empty.
    pub(crate) fn post_json_discard<B>(&self, url: &Url, body: &B) -> Result<(), HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::Post, self.agent.post(url.as_str()), url, body)
            .map(drop)
    }

    /// Puts `body` and ignores the response body.
    pub(crate) fn put_json<B>(&self, url: &Url, body: &B) -> Result<(), HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::Put, self.agent.put(url.as_str()), url, body)
            .map(drop)
    }

    fn send_json<B>(
        &self,
        method: Method,
        request: RequestBuilder<WithBody>,
        url: &Url,
        body: &B,
    ) -> Result<String, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(body).map_err(|err| HttpError::Json {
            method: method.as_str(),
            url: url.to_string(),
            err,
        })?;

        debug!("{} {url} ({} bytes)", method.as_str(), bytes.len());
        let response = self
            .prepare(request)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json; charset=utf-8")
            .send(&bytes[..]);
        read_response(method, url, response)
    }

    fn prepare<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        let request = request.header("User-Agent", USER_AGENT);
        match &*self.authorization {
            Some(value) => request.header("Authorization", value.as_str()),
            None => request,
        }
    }
}

fn read_response(
    method: Method,
    url: &Url,
    response: Result<Response<Body>, ureq::Error>,
) -> Result<String, HttpError> {
    let mut response = response.map_err(|err| transport_error(method, url, err))?;
    let status = response.status();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|err| transport_error(method, url, err))?;

    if !status.is_success() {
        return Err(HttpError::Status {
            method: method.as_str(),
            url: url.to_string(),
            status: status.as_u16(),
            body: text.chars().take(BODY_EXCERPT_LEN).collect(),
        });
    }
    Ok(text)
}

fn decode<T: DeserializeOwned>(method: Method, url: &Url, text: &str) -> Result<T, HttpError> {
    serde_json::from_str(text).map_err(|err| HttpError::Json {
        method: method.as_str(),
        url: url.to_string(),
        err,
    })
}

fn transport_error(method: Method, url: &Url, err: ureq::Error) -> HttpError {
    HttpError::Transport {
        method: method.as_str(),
        url: url.to_string(),
        err: Box::new(err),
    }
}
