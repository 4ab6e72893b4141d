//! `apiprobe-http` is a resilient async HTTP request helper for exercising a
//! remote JSON API from tests.
//!
//! It joins relative paths onto a normalized base address, bounds every
//! attempt with a timeout and retries transient failures with backoff:
//! - [`ApiClient::request`]
//! - [`request`] (process-wide client configured from `BASE_URL`)
//!
//! Responses are returned whatever their status; callers assert on
//! [`ApiResponse::status`] themselves.

mod address;
mod backoff;
mod client;
mod error;
mod options;
mod response;
mod value;

pub mod debug;
pub mod retry;
pub mod schema;

pub use address::{build_url, normalize_base, DEFAULT_BASE_URL};
pub use backoff::{parse_retry_after, BackoffPolicy};
pub use client::{request, ApiClient, BASE_URL_ENV};
pub use debug::{AttemptObserver, DebugSnapshot, LastAttempt, SnapshotOutcome};
pub use error::{RequestError, TransportKind};
pub use options::{ClientOptions, RequestOptions, DEFAULT_RETRIES, DEFAULT_TIMEOUT};
pub use response::{ApiResponse, Headers};
pub use reqwest::Method;
pub use value::QueryValue;

pub type Result<T> = std::result::Result<T, RequestError>;
