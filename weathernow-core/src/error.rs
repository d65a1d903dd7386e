use thiserror::Error;

/// Errors produced by the upstream clients and the week bucketizer.
///
/// Callers decide severity by call site: a failed place search is retryable
/// and rendered as "no result", while a failed forecast fetch after a place
/// was already resolved is fatal for that attempt.
#[derive(Debug, Error)]
pub enum WeatherNowError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("request to the {endpoint} endpoint failed")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Upstream body did not match the expected JSON shape.
    #[error("failed to parse {endpoint} JSON")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Upstream body decoded, but a field value is unusable.
    #[error("{endpoint} response contained malformed data: {detail}")]
    Malformed {
        endpoint: &'static str,
        detail: String,
    },

    /// Hourly series length is unusable under the active length policy.
    #[error("expected {expected} hourly samples, got {actual}")]
    HourCount { expected: usize, actual: usize },
}

/// Cap upstream error bodies quoted in messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
