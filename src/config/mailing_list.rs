//! Mailing-list provider configuration.

use std::env;

/// Credentials and addressing for the upstream mailing-list provider.
#[derive(Clone)]
pub struct MailingListConfig {
    /// Provider API key, used as the basic-auth password.
    pub api_key: String,
    /// Address of the single managed list, e.g. `news@lists.example.com`.
    pub list_address: String,
    /// Provider API root.
    pub base_url: String,
}

impl Default for MailingListConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            list_address: String::new(),
            base_url: "https://api.mailgun.net/v3".to_string(),
        }
    }
}

impl MailingListConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let api_key = env::var("MAILGUN_API_KEY").unwrap_or_default();
        let list_address = env::var("MAILGUN_LIST_ADDRESS").unwrap_or_default();
        let base_url = env::var("MAILGUN_BASE_URL")
            .unwrap_or_else(|_| "https://api.mailgun.net/v3".to_string());

        Self {
            api_key,
            list_address,
            base_url,
        }
    }

    /// Fail fast when provider credentials are missing.
    ///
    /// Unlike the signing secret, the service cannot do anything useful
    /// without these, so `main` refuses to start.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("MAILGUN_API_KEY is not set".to_string());
        }
        if self.list_address.is_empty() {
            return Err("MAILGUN_LIST_ADDRESS is not set".to_string());
        }
        Ok(())
    }
}
