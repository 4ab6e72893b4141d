use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

use crate::{address::DEFAULT_BASE_URL, BackoffPolicy, QueryValue, RequestError, Result};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Default number of retries after the initial attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Client-wide settings shared by every call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Base address relative paths are joined onto.
    pub base_url: String,
    /// Value of the `User-Agent` header sent with each attempt.
    pub user_agent: String,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: concat!("apiprobe-http/", env!("CARGO_PKG_VERSION")).to_owned(),
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Per-call request settings.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    /// Query parameters applied in order with set semantics.
    pub params: Vec<(String, QueryValue)>,
    /// JSON body; ignored for GET.
    pub body: Option<serde_json::Value>,
    /// Extra headers; override defaults of the same name.
    pub headers: Vec<(String, String)>,
    /// Deadline for each individual attempt.
    pub timeout: Duration,
    /// Retries allowed after the initial attempt.
    pub retries: u32,
    /// Overrides the client's base address for this call.
    pub base_url: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            params: Vec::new(),
            body: None,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            base_url: None,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serializes `body` to JSON for non-GET requests.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).map_err(RequestError::Encode)?);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Body to send, if any: never for GET, never for a JSON `null`.
    pub(crate) fn effective_body(&self) -> Option<&serde_json::Value> {
        if self.method == Method::GET {
            return None;
        }
        self.body.as_ref().filter(|body| !body.is_null())
    }
}
