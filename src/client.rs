use std::fmt;
use std::sync::{Arc, OnceLock};

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tokio::time::{sleep, timeout};
use url::Url;

use crate::{
    address::build_url,
    debug::{AttemptObserver, DebugSnapshot, SnapshotOutcome},
    retry::AttemptState,
    ApiResponse, ClientOptions, RequestError, RequestOptions, Result,
};

/// Environment variable that overrides the default base address.
pub const BASE_URL_ENV: &str = "BASE_URL";

static DEFAULT_CLIENT: OnceLock<ApiClient> = OnceLock::new();

/// Issues `path` with the process-wide client built by [`ApiClient::from_env`].
pub async fn request(path: &str, opts: RequestOptions) -> Result<ApiResponse> {
    DEFAULT_CLIENT
        .get_or_init(ApiClient::from_env)
        .request(path, opts)
        .await
}

#[derive(Clone)]
/// Retrying HTTP client for a JSON API.
pub struct ApiClient {
    http: reqwest::Client,
    options: ClientOptions,
    observer: Option<Arc<dyn AttemptObserver>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("options", &self.options)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a client for the default API base.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            options: ClientOptions::default(),
            observer: None,
        }
    }

    /// Creates a client whose base address comes from `BASE_URL` when it is
    /// set and not blank.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use apiprobe_http::ApiClient;
    ///
    /// let api = ApiClient::from_env();
    /// ```
    pub fn from_env() -> Self {
        let mut client = Self::new();
        if let Some(base_url) = base_from_env(std::env::var(BASE_URL_ENV).ok()) {
            client.options.base_url = base_url;
        }
        client
    }

    /// Replaces client options such as base address and backoff.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Installs an observer that receives a snapshot after every attempt.
    pub fn with_observer(mut self, observer: impl AttemptObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends a request, retrying 429/5xx responses and transient transport
    /// failures up to `opts.retries` times.
    ///
    /// Any HTTP status is returned as a response. Only transport failures,
    /// URL errors and body-encoding errors are returned as `Err`.
    pub async fn request(&self, path: &str, opts: RequestOptions) -> Result<ApiResponse> {
        let mut state = AttemptState::start();
        loop {
            state = match state {
                AttemptState::Attempting { attempt } => self.attempt(path, &opts, attempt).await,
                AttemptState::AwaitingBackoff { attempt, delay } => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "backing off before retry"
                    );

                    sleep(delay).await;
                    AttemptState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                AttemptState::Done(response) => return Ok(response),
                AttemptState::Failed(err) => return Err(err),
            };
        }
    }

    async fn attempt(&self, path: &str, opts: &RequestOptions, attempt: u32) -> AttemptState {
        let base = opts.base_url.as_deref().unwrap_or(&self.options.base_url);
        let url = match build_url(path, base, &opts.params) {
            Ok(url) => url,
            Err(err) => return AttemptState::Failed(err),
        };
        let request = match self.prepare(url.clone(), opts) {
            Ok(request) => request,
            Err(err) => return AttemptState::Failed(err),
        };

        // Deadline covers the exchange up to response headers, not the body.
        let sent = match timeout(opts.timeout, request.send()).await {
            Ok(sent) => sent.map_err(|err| RequestError::transport(err, attempt)),
            Err(_) => Err(RequestError::Timeout {
                attempt,
                after: opts.timeout,
            }),
        };

        match sent {
            Ok(response) => {
                let response = ApiResponse::new(response, attempt);

                #[cfg(feature = "tracing")]
                tracing::debug!(%url, attempt, status = response.status(), "attempt completed");

                self.observe(
                    &url,
                    attempt,
                    SnapshotOutcome::Response {
                        status: response.status(),
                        headers: response.headers().to_pairs(),
                    },
                );
                AttemptState::after_response(response, attempt, opts.retries, &self.options.backoff)
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%url, attempt, error = %err, "attempt failed");

                self.observe(&url, attempt, SnapshotOutcome::Error(err.to_string()));
                AttemptState::after_error(err, attempt, opts.retries, &self.options.backoff)
            }
        }
    }

    fn prepare(&self, url: Url, opts: &RequestOptions) -> Result<reqwest::RequestBuilder> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            header_value(header::USER_AGENT.as_str(), &self.options.user_agent)?,
        );

        for (name, value) in &opts.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| RequestError::InvalidHeader {
                    name: name.clone(),
                })?;
            headers.insert(header_name, header_value(name, value)?);
        }

        let mut builder = self.http.request(opts.method.clone(), url);

        if let Some(body) = opts.effective_body() {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            let encoded = serde_json::to_vec(body).map_err(RequestError::Encode)?;
            builder = builder.body(encoded);
        }

        Ok(builder.headers(headers))
    }

    fn observe(&self, url: &Url, attempt: u32, outcome: SnapshotOutcome) {
        if let Some(observer) = &self.observer {
            observer.on_attempt(&DebugSnapshot {
                url: url.to_string(),
                attempt,
                outcome,
            });
        }
    }
}

/// `BASE_URL` value to use, if it is set and not blank.
fn base_from_env(value: Option<String>) -> Option<String> {
    value.filter(|base_url| !base_url.trim().is_empty())
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| RequestError::InvalidHeader {
        name: name.to_owned(),
    })
}
