use std::error::Error as _;
use std::fmt;
use std::io;
use std::time::Duration;

/// Transport failure category, used to decide whether an attempt is retried.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportKind {
    /// The per-attempt deadline expired and the request was aborted.
    Timeout,
    /// The peer reset or closed the connection mid-exchange.
    ConnectionReset,
    /// The host name could not be resolved.
    HostUnresolved,
    /// Nothing was listening on the target address.
    ConnectionRefused,
    Other,
}

impl TransportKind {
    /// Classifies a `reqwest` error by walking its source chain.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                match io_err.kind() {
                    io::ErrorKind::TimedOut => return Self::Timeout,
                    io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof => return Self::ConnectionReset,
                    io::ErrorKind::ConnectionRefused => return Self::ConnectionRefused,
                    _ => {}
                }
            }

            let message = cause.to_string();
            if message.contains("dns error") || message.contains("failed to lookup address") {
                return Self::HostUnresolved;
            }
            if message.contains("connection closed before message completed") {
                return Self::ConnectionReset;
            }
            source = cause.source();
        }

        Self::Other
    }

    /// Whether another attempt may succeed after this failure.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionReset | Self::HostUnresolved
        )
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::ConnectionReset => "connection reset",
            Self::HostUnresolved => "host unresolved",
            Self::ConnectionRefused => "connection refused",
            Self::Other => "transport failure",
        };
        f.write_str(label)
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Base address, path or joined result is not a valid URL.
    #[error("invalid url '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
    /// Caller-supplied header name or value is not valid HTTP.
    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },
    /// Request body could not be serialized as JSON.
    #[error("request body encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    /// The attempt's deadline expired before response headers arrived.
    #[error("timeout after {}ms on attempt {attempt}", .after.as_millis())]
    Timeout {
        /// Zero-based attempt that timed out.
        attempt: u32,
        after: Duration,
    },
    /// Network failure from `reqwest`.
    #[error("{kind} on attempt {attempt}: {source}")]
    Transport {
        kind: TransportKind,
        /// Zero-based attempt that produced the error.
        attempt: u32,
        #[source]
        source: reqwest::Error,
    },
    /// Reading the response body failed.
    #[error("response body error: {0}")]
    Body(#[source] reqwest::Error),
    /// Response body is not the expected JSON.
    #[error("decode error: {0}")]
    Decode(String),
}

impl RequestError {
    pub(crate) fn transport(source: reqwest::Error, attempt: u32) -> Self {
        Self::Transport {
            kind: TransportKind::classify(&source),
            attempt,
            source,
        }
    }

    /// True for transport failures the executor would retry given budget left.
    pub fn is_retryable(&self) -> bool {
        self.transport_kind().is_some_and(TransportKind::is_transient)
    }

    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            Self::Timeout { .. } => Some(TransportKind::Timeout),
            _ => None,
        }
    }

    /// Attempt index of a transport failure or timeout.
    pub fn attempt(&self) -> Option<u32> {
        match self {
            Self::Transport { attempt, .. } | Self::Timeout { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestError, TransportKind};

    #[test]
    fn transient_kinds() {
        assert!(TransportKind::Timeout.is_transient());
        assert!(TransportKind::ConnectionReset.is_transient());
        assert!(TransportKind::HostUnresolved.is_transient());
        assert!(!TransportKind::ConnectionRefused.is_transient());
        assert!(!TransportKind::Other.is_transient());
    }

    #[test]
    fn timeout_is_retryable_transport_failure() {
        let err = RequestError::Timeout {
            attempt: 1,
            after: std::time::Duration::from_millis(250),
        };
        assert!(err.is_retryable());
        assert_eq!(err.transport_kind(), Some(TransportKind::Timeout));
        assert_eq!(err.attempt(), Some(1));
        assert_eq!(err.to_string(), "timeout after 250ms on attempt 1");
    }

    #[test]
    fn invalid_url_is_not_retryable() {
        let source = url::Url::parse("not a url").expect_err("must fail to parse");
        let err = RequestError::InvalidUrl {
            input: "not a url".to_owned(),
            source,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.attempt(), None);
        assert!(err.to_string().contains("not a url"));
    }
}
