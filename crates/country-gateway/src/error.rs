//! Error taxonomy and classification for the gateway.
//!
//! Uses `thiserror` for structured error handling with automatic `From`
//! implementations. Two layers: [`UpstreamError`] for the HTTP client against
//! the provider, [`GatewayError`] for everything the pipeline can surface.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

/// Errors from the upstream HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    /// HTTP transport error (connection, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream responded with a non-success status.
    #[error("Upstream status {status}: {message}")]
    Status {
        /// HTTP status code from the provider.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// Legitimate empty result, distinct from transport failure.
    #[error("No country matched '{name}'")]
    NotFound {
        /// The name that matched nothing.
        name: String,
    },

    /// JSON parsing error.
    #[error("Failed to parse upstream response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Create a status error from an upstream response.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    /// Create a not-found outcome for a name query.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Whether this failure should trigger the relaxed fallback query.
    ///
    /// Only confirmed "no exact match" signals qualify; transient failures
    /// must propagate so real outages are not masked.
    #[must_use]
    pub const fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Status { status: 400 | 404, .. })
    }
}

/// Normalized error taxonomy surfaced by the request pipeline.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Too many requests from one identity within the window.
    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited {
        /// Time until the window resets.
        retry_after: Duration,
    },

    /// Missing, malformed, or mismatched bearer credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// Legitimate empty result.
    #[error("Not found: {resource}")]
    NotFound {
        /// Description of what was looked up.
        resource: String,
    },

    /// Upstream produced no response at all.
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Transport-level description.
        message: String,
    },

    /// Upstream responded with an error status.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// Status code reported by the provider.
        status: u16,
        /// Detail from the provider.
        message: String,
    },

    /// Unexpected failure; details are never sent to clients.
    #[error("Internal error: {message}")]
    Internal {
        /// Internal description, for logs only.
        message: String,
    },
}

impl GatewayError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Get the retry-after duration if this is a rate-limit rejection.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// The HTTP status this error maps to.
    ///
    /// Upstream statuses are mirrored; anything that is not a representable
    /// HTTP status becomes 502.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the HTTP-facing representation.
    ///
    /// `verbose` (development mode) includes upstream detail; internal errors
    /// never leak detail regardless.
    #[must_use]
    pub fn to_response(&self, verbose: bool) -> (StatusCode, serde_json::Value) {
        let status = self.status_code();
        let body = match self {
            Self::RateLimited { retry_after } => json!({
                "error": "Too many requests, please try again later",
                "retryAfter": retry_after.as_secs(),
            }),
            Self::Unauthorized => json!({
                "error": "Unauthorized",
            }),
            Self::NotFound { resource } => json!({
                "error": format!("Not found: {resource}"),
            }),
            Self::UpstreamUnavailable { message } => {
                let mut body = json!({
                    "error": "Country data provider is not responding",
                });
                if verbose {
                    body["detail"] = json!(message);
                }
                body
            }
            Self::Upstream { status: upstream_status, message } => {
                let mut body = json!({
                    "error": "Country data provider returned an error",
                    "upstreamStatus": upstream_status,
                });
                if verbose {
                    body["detail"] = json!(message);
                }
                body
            }
            Self::Internal { .. } => json!({
                "error": "Internal server error",
            }),
        };

        (status, body)
    }
}

/// Classify an upstream failure into the gateway taxonomy.
impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Http(e) => {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    Self::UpstreamUnavailable { message: e.to_string() }
                } else {
                    Self::Internal { message: e.to_string() }
                }
            }
            UpstreamError::Status { status, message } => Self::Upstream { status, message },
            UpstreamError::NotFound { name } => Self::NotFound { resource: name },
            UpstreamError::Parse(e) => Self::Internal { message: e.to_string() },
        }
    }
}

/// Result type alias for upstream client operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Result type alias for pipeline operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_trigger_statuses() {
        assert!(UpstreamError::status(400, "bad").triggers_fallback());
        assert!(UpstreamError::status(404, "missing").triggers_fallback());

        assert!(!UpstreamError::status(500, "boom").triggers_fallback());
        assert!(!UpstreamError::status(503, "down").triggers_fallback());
        assert!(!UpstreamError::not_found("congo").triggers_fallback());
    }

    #[test]
    fn test_status_codes() {
        let err = GatewayError::RateLimited { retry_after: Duration::from_secs(60) };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        assert_eq!(GatewayError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(GatewayError::not_found("x").status_code(), StatusCode::NOT_FOUND);

        // Mirrored upstream status
        let err = GatewayError::Upstream { status: 418, message: String::new() };
        assert_eq!(err.status_code(), StatusCode::IM_A_TEAPOT);

        // Unrepresentable status falls back to 502
        let err = GatewayError::Upstream { status: 99, message: String::new() };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_upstream_detail_gated_by_mode() {
        let err = GatewayError::Upstream { status: 502, message: "cloudflare".to_string() };

        let (_, dev_body) = err.to_response(true);
        assert_eq!(dev_body["detail"], "cloudflare");

        let (_, prod_body) = err.to_response(false);
        assert!(prod_body.get("detail").is_none());
        assert_eq!(prod_body["upstreamStatus"], 502);
    }

    #[test]
    fn test_internal_error_never_leaks() {
        let err = GatewayError::internal("db password is hunter2");
        let (status, body) = err.to_response(true);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("hunter2"));
    }

    #[test]
    fn test_classification_of_upstream_errors() {
        let err: GatewayError = UpstreamError::status(500, "boom").into();
        assert!(matches!(err, GatewayError::Upstream { status: 500, .. }));

        let err: GatewayError = UpstreamError::not_found("atlantis").into();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }
}
