//! Attempt state machine driven by the request executor.

use std::time::Duration;

use reqwest::StatusCode;

use crate::{ApiResponse, BackoffPolicy, RequestError};

/// 429 and every status from 500 up ask for another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500
}

/// What to do with a finished attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    Retry,
    Finish,
}

/// Transition rule shared by responses and transport errors.
///
/// A retryable outcome is retried while `attempt < retries`, which caps the
/// total number of attempts at `retries + 1`.
pub fn disposition(retryable: bool, attempt: u32, retries: u32) -> Disposition {
    if retryable && attempt < retries {
        Disposition::Retry
    } else {
        Disposition::Finish
    }
}

/// Executor state. `Done` and `Failed` are terminal.
#[derive(Debug)]
pub enum AttemptState {
    Attempting { attempt: u32 },
    AwaitingBackoff { attempt: u32, delay: Duration },
    Done(ApiResponse),
    Failed(RequestError),
}

impl AttemptState {
    pub fn start() -> Self {
        Self::Attempting { attempt: 0 }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }

    pub(crate) fn after_response(
        response: ApiResponse,
        attempt: u32,
        retries: u32,
        backoff: &BackoffPolicy,
    ) -> Self {
        let retryable = is_retryable_status(response.status_code());

        match disposition(retryable, attempt, retries) {
            Disposition::Retry => {
                let hint = response.headers().get("retry-after");
                let delay = backoff.delay(attempt, hint);
                Self::AwaitingBackoff { attempt, delay }
            }
            Disposition::Finish => {
                if retryable {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        status = response.status(),
                        attempts = attempt + 1,
                        "retries exhausted, returning last response"
                    );
                }
                Self::Done(response)
            }
        }
    }

    pub(crate) fn after_error(
        err: RequestError,
        attempt: u32,
        retries: u32,
        backoff: &BackoffPolicy,
    ) -> Self {
        match disposition(err.is_retryable(), attempt, retries) {
            Disposition::Retry => Self::AwaitingBackoff {
                attempt,
                delay: backoff.delay(attempt, None),
            },
            Disposition::Finish => Self::Failed(err),
        }
    }
}
