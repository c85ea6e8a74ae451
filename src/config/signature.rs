//! Request-signature configuration.

use std::env;

/// Shared secret and replay window for signed requests.
///
/// An unset secret is deliberately not a startup error: public routes keep
/// working and protected routes answer with a configuration-error response.
#[derive(Clone)]
pub struct SignatureConfig {
    /// Shared signing secret. Empty means "not configured".
    pub secret: String,
    /// Accepted clock skew on either side of the server time, in seconds.
    pub timestamp_window_seconds: u64,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            timestamp_window_seconds: 300,
        }
    }
}

impl SignatureConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let secret = env::var("API_SECRET").unwrap_or_default();

        let timestamp_window_seconds = env::var("SIGNATURE_TIMESTAMP_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Self {
            secret,
            timestamp_window_seconds,
        }
    }

    /// Test helper: a config with the given secret and the default window.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }
}
