//! Bearer-token authentication against a single shared secret.

/// Validates bearer credentials against a configured secret.
///
/// Intentionally minimal: exact match, no hashing, no expiry. Missing,
/// malformed, and mismatched credentials are indistinguishable to the client.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    secret: Option<String>,
}

impl AuthGuard {
    /// Create a guard. With `None` the guard never requires authentication.
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Whether a secret is configured and credentials are required.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.secret.is_some()
    }

    /// Validate an `Authorization` header value.
    ///
    /// Always passes when no secret is configured. Otherwise the header must
    /// be present, carry a `Bearer ` prefix, and match the secret exactly.
    #[must_use]
    pub fn validate(&self, header: Option<&str>) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };

        header
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|token| token == secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_when_no_secret() {
        let guard = AuthGuard::new(None);
        assert!(!guard.required());
        assert!(guard.validate(None));
        assert!(guard.validate(Some("Bearer whatever")));
    }

    #[test]
    fn test_valid_token_passes() {
        let guard = AuthGuard::new(Some("s3cret".to_string()));
        assert!(guard.required());
        assert!(guard.validate(Some("Bearer s3cret")));
    }

    #[test]
    fn test_all_failure_modes_rejected_uniformly() {
        let guard = AuthGuard::new(Some("s3cret".to_string()));

        // Missing header
        assert!(!guard.validate(None));
        // Malformed header (no "Bearer " prefix)
        assert!(!guard.validate(Some("s3cret")));
        assert!(!guard.validate(Some("Basic s3cret")));
        assert!(!guard.validate(Some("bearer s3cret")));
        // Mismatched token
        assert!(!guard.validate(Some("Bearer wrong")));
        // Prefix of the secret is not enough
        assert!(!guard.validate(Some("Bearer s3c")));
    }
}
