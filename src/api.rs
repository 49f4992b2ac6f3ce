// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the hotel REST backend.
//!
//! Every request body is wrapped as `{ "data": ... }` and every response is
//! unwrapped from the same envelope.

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const UA: &str = concat!(
    "frontdesk/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/frontdesk)"
);

pub const ROOM_CATEGORIES: &str = "room-categories";
pub const ROOMS: &str = "rooms";
pub const ROOM_BOOKINGS: &str = "room-bookings";
pub const RESTAURANT_INVOICES: &str = "restaurant-invoices";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication required")]
    Unauthorized,
    #[error("permission denied: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected by backend: {0}")]
    Validation(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Credentials for one staff session. Passed explicitly to every client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub base_url: String,
    pub token: Option<String>,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }

    pub fn url(&self, resource: &str, id: Option<i64>) -> String {
        let base = self.base_url.trim_end_matches('/');
        match id {
            Some(id) => format!("{}/api/{}/{}", base, resource, id),
            None => format!("{}/api/{}", base, resource),
        }
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    session: Session,
}

impl ApiClient {
    pub fn new(session: Session) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(UA)
            .build()?;
        Ok(Self { client, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.auth_header() {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        }
    }

    pub fn list<T: DeserializeOwned>(&self, resource: &str) -> ApiResult<Vec<T>> {
        let url = self.session.url(resource, None);
        tracing::debug!(%url, "GET");
        let resp = self.authed(self.client.get(&url)).send()?;
        unwrap_envelope(resp)
    }

    pub fn get<T: DeserializeOwned>(&self, resource: &str, id: i64) -> ApiResult<T> {
        let url = self.session.url(resource, Some(id));
        tracing::debug!(%url, "GET");
        let resp = self.authed(self.client.get(&url)).send()?;
        unwrap_envelope(resp)
    }

    pub fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.session.url(resource, None);
        tracing::debug!(%url, "POST");
        let resp = self
            .authed(self.client.post(&url))
            .json(&Envelope::new(body))
            .send()?;
        unwrap_envelope(resp)
    }

    pub fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &str,
        id: i64,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.session.url(resource, Some(id));
        tracing::debug!(%url, "PUT");
        let resp = self
            .authed(self.client.put(&url))
            .json(&Envelope::new(body))
            .send()?;
        unwrap_envelope(resp)
    }
}

fn unwrap_envelope<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text()?;
        return Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(body),
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(body)
            }
            other => ApiError::Status {
                status: other.as_u16(),
                body,
            },
        });
    }
    let text = resp.text()?;
    decode_envelope(&text)
}

pub fn decode_envelope<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    serde_json::from_str::<Envelope<T>>(text)
        .map(|e| e.data)
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
