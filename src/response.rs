use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{RequestError, Result};

/// Read-only view over response headers with case-insensitive lookup.
#[derive(Clone, Debug)]
pub struct Headers(HeaderMap);

impl Headers {
    /// First value of `name`, if present and valid UTF-8.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// All headers as owned pairs, in map order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }
}

/// Final response of a call. The status is never interpreted as an error.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    headers: Headers,
    url: Url,
    attempts: u32,
    inner: reqwest::Response,
}

impl ApiResponse {
    pub(crate) fn new(inner: reqwest::Response, attempt: u32) -> Self {
        Self {
            status: inner.status(),
            headers: Headers(inner.headers().clone()),
            url: inner.url().clone(),
            attempts: attempt + 1,
            inner,
        }
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// URL of the attempt that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Number of attempts made, including the one that produced this response.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub async fn bytes(self) -> Result<Bytes> {
        self.inner.bytes().await.map_err(RequestError::Body)
    }

    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(RequestError::Body)
    }

    /// Reads the body and deserializes it as `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| {
            RequestError::Decode(format!(
                "invalid JSON response: {err}; body: {}",
                String::from_utf8_lossy(&body)
            ))
        })
    }

    pub async fn json_value(self) -> Result<serde_json::Value> {
        self.json().await
    }
}
