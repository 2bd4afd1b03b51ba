//! Error types for the shop API client.
//!
//! # Design
//! Every failure a caller can observe is one `ApiError` variant, so code that
//! needs to branch on the cause (retry a timeout, never retry a 4xx) matches
//! on the variant instead of inspecting message text. The `Display` output of
//! `HttpStatus` is the dashboard-facing message: `[404] Not Found — not found`.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server did not answer within the configured timeout.
    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The caller cancelled the request before it settled.
    #[error("request cancelled")]
    Cancelled,

    /// The request never produced an HTTP response (DNS, refused, reset, TLS).
    #[error("network unavailable: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("{}", status_message(.status, .reason, .detail))]
    HttpStatus {
        status: u16,
        reason: String,
        detail: Option<String>,
    },

    /// A 2xx body could not be decoded into the type the caller asked for.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The request descriptor was rejected before reaching the transport.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status code, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether re-issuing the same request could plausibly succeed.
    ///
    /// Timeouts, transport failures, 429 and 5xx are transient; every other
    /// status, decode and encode failure will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => true,
            ApiError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

fn status_message(status: &u16, reason: &str, detail: &Option<String>) -> String {
    let mut message = format!("[{status}] {reason}");
    if let Some(detail) = detail.as_deref().filter(|d| !d.is_empty()) {
        message.push_str(" — ");
        message.push_str(detail);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, reason: &str, detail: Option<&str>) -> ApiError {
        ApiError::HttpStatus {
            status,
            reason: reason.to_string(),
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn http_status_message_includes_detail() {
        assert_eq!(
            http(404, "Not Found", Some("not found")).to_string(),
            "[404] Not Found — not found"
        );
    }

    #[test]
    fn http_status_message_omits_empty_detail() {
        assert_eq!(http(500, "Internal Server Error", None).to_string(), "[500] Internal Server Error");
        assert_eq!(http(502, "Bad Gateway", Some("")).to_string(), "[502] Bad Gateway");
    }

    #[test]
    fn timeout_message_reports_seconds() {
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(15)).to_string(),
            "request timed out after 15s"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ApiError::Network("refused".into()).is_retryable());
        assert!(http(503, "Service Unavailable", None).is_retryable());
        assert!(http(429, "Too Many Requests", None).is_retryable());
        assert!(!http(404, "Not Found", None).is_retryable());
        assert!(!http(400, "Bad Request", Some("Insufficient stock")).is_retryable());
        assert!(!ApiError::Decode("bad".into()).is_retryable());
        assert!(!ApiError::Cancelled.is_retryable());
    }

    #[test]
    fn status_accessors() {
        assert_eq!(http(404, "Not Found", None).status(), Some(404));
        assert!(http(404, "Not Found", None).is_not_found());
        assert_eq!(ApiError::Cancelled.status(), None);
        assert!(!ApiError::Cancelled.is_not_found());
    }
}
