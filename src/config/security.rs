//! Security response-header configuration.

use std::env;

/// Settings for the security-headers middleware.
///
/// Everything defaults to the strict variant; individual headers can be
/// relaxed through the environment when a deployment needs it.
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    pub csp_directives: Option<String>,
    pub hsts_max_age: Option<u32>,
    pub frame_options: String,
    pub referrer_policy: String,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            csp_directives: Some("default-src 'none'; frame-ancestors 'none'".to_string()),
            hsts_max_age: Some(31_536_000),
            frame_options: "DENY".to_string(),
            referrer_policy: "no-referrer".to_string(),
        }
    }
}

impl SecurityHeadersConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let csp_directives = match env::var("SECURITY_CSP") {
            Ok(v) if v.to_lowercase() == "off" => None,
            Ok(v) => Some(v),
            Err(_) => defaults.csp_directives,
        };

        let hsts_max_age = match env::var("SECURITY_HSTS_MAX_AGE") {
            Ok(v) if v == "0" => None,
            Ok(v) => v.parse().ok().or(defaults.hsts_max_age),
            Err(_) => defaults.hsts_max_age,
        };

        let frame_options =
            env::var("SECURITY_FRAME_OPTIONS").unwrap_or(defaults.frame_options);
        let referrer_policy =
            env::var("SECURITY_REFERRER_POLICY").unwrap_or(defaults.referrer_policy);

        Self {
            csp_directives,
            hsts_max_age,
            frame_options,
            referrer_policy,
        }
    }
}
