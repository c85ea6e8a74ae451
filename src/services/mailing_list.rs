//! Mailing-list provider operations.
//!
//! Thin translation layer between the API routes and the provider's member
//! endpoints. Provider JSON is passed through untouched on success; error
//! statuses surface with whatever message the provider supplied.

use crate::{
    config::MailingListConfig,
    models::{NewSubscriberRequest, SubscriberUpdateRequest},
    services::upstream::{UpstreamClient, UpstreamError},
};
use reqwest::Response;
use tracing::info;

/// Errors surfaced by provider operations.
#[derive(Debug, thiserror::Error)]
pub enum MailingListError {
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// The call never produced a usable provider response.
    #[error(transparent)]
    Transport(#[from] UpstreamError),

    /// The provider answered 2xx with a body that is not JSON.
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

/// Client for the single configured mailing list.
#[derive(Clone)]
pub struct MailingListService {
    client: UpstreamClient,
    config: MailingListConfig,
}

impl MailingListService {
    pub fn new(config: MailingListConfig, client: UpstreamClient) -> Self {
        Self { client, config }
    }

    fn members_url(&self) -> String {
        format!(
            "{}/lists/{}/members",
            self.config.base_url, self.config.list_address
        )
    }

    fn member_url(&self, address: &str) -> String {
        format!("{}/{}", self.members_url(), address)
    }

    fn auth(&self) -> Option<(&str, &str)> {
        Some(("api", &self.config.api_key))
    }

    /// Fetch all members of the list.
    pub async fn list_members(&self) -> Result<serde_json::Value, MailingListError> {
        let url = self.members_url();
        info!(url = %url, "Fetching list members from provider");
        let response = self.client.get(&url, self.auth()).await?;
        Self::into_json(response).await
    }

    /// Add a member, or update it when `upsert` is set.
    pub async fn add_member(
        &self,
        request: &NewSubscriberRequest,
    ) -> Result<serde_json::Value, MailingListError> {
        let url = self.members_url();
        let form = add_member_form(request);
        info!(url = %url, address = %request.address, "Adding list member at provider");
        let response = self.client.post_form(&url, self.auth(), form).await?;
        Self::into_json(response).await
    }

    /// Fetch a single member by address.
    pub async fn get_member(&self, address: &str) -> Result<serde_json::Value, MailingListError> {
        let url = self.member_url(address);
        info!(url = %url, "Fetching list member from provider");
        let response = self.client.get(&url, self.auth()).await?;
        Self::into_json(response).await
    }

    /// Update name and/or subscription status of a member.
    pub async fn update_member(
        &self,
        address: &str,
        update: &SubscriberUpdateRequest,
    ) -> Result<serde_json::Value, MailingListError> {
        let url = self.member_url(address);
        let form = update_member_form(update);
        info!(url = %url, "Updating list member at provider");
        let response = self.client.put_form(&url, self.auth(), form).await?;
        Self::into_json(response).await
    }

    /// Remove a member from the list.
    pub async fn delete_member(
        &self,
        address: &str,
    ) -> Result<serde_json::Value, MailingListError> {
        let url = self.member_url(address);
        info!(url = %url, "Deleting list member at provider");
        let response = self.client.delete(&url, self.auth()).await?;
        Self::into_json(response).await
    }

    /// Pass provider JSON through, turning error statuses into
    /// `MailingListError::Provider` with the provider's own message when
    /// one is present.
    async fn into_json(response: Response) -> Result<serde_json::Value, MailingListError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| MailingListError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Provider request failed with status {status}"));

        Err(MailingListError::Provider {
            status: status.as_u16(),
            message,
        })
    }
}

/// Form body for a create/upsert call. The provider expects lowercase
/// string booleans.
fn add_member_form(request: &NewSubscriberRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("address".to_string(), request.address.clone()),
        (
            "subscribed".to_string(),
            request.subscribed.unwrap_or(true).to_string(),
        ),
        (
            "upsert".to_string(),
            request.upsert.unwrap_or(true).to_string(),
        ),
    ];
    if let Some(name) = &request.name {
        form.push(("name".to_string(), name.clone()));
    }
    form
}

/// Form body for an update call; only provided fields are sent.
fn update_member_form(update: &SubscriberUpdateRequest) -> Vec<(String, String)> {
    let mut form = Vec::new();
    if let Some(name) = &update.name {
        form.push(("name".to_string(), name.clone()));
    }
    if let Some(subscribed) = update.subscribed {
        form.push(("subscribed".to_string(), subscribed.to_string()));
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::upstream::UpstreamClientConfig;

    fn service() -> MailingListService {
        let config = MailingListConfig {
            api_key: "key-test".to_string(),
            list_address: "news@lists.example.com".to_string(),
            base_url: "https://api.mailgun.net/v3".to_string(),
        };
        let client = UpstreamClient::new(UpstreamClientConfig::default(), None).unwrap();
        MailingListService::new(config, client)
    }

    #[test]
    fn url_construction() {
        let service = service();
        assert_eq!(
            service.members_url(),
            "https://api.mailgun.net/v3/lists/news@lists.example.com/members"
        );
        assert_eq!(
            service.member_url("user@example.com"),
            "https://api.mailgun.net/v3/lists/news@lists.example.com/members/user@example.com"
        );
    }

    #[test]
    fn add_member_form_defaults_and_booleans() {
        let request = NewSubscriberRequest {
            address: "user@example.com".to_string(),
            name: None,
            subscribed: None,
            upsert: Some(false),
        };
        let form = add_member_form(&request);

        assert!(form.contains(&("address".to_string(), "user@example.com".to_string())));
        // Omitted `subscribed` defaults to true; booleans serialize lowercase.
        assert!(form.contains(&("subscribed".to_string(), "true".to_string())));
        assert!(form.contains(&("upsert".to_string(), "false".to_string())));
        assert!(!form.iter().any(|(k, _)| k == "name"));
    }

    #[test]
    fn update_form_sends_only_provided_fields() {
        let update = SubscriberUpdateRequest {
            name: Some("Test User".to_string()),
            subscribed: None,
        };
        let form = update_member_form(&update);
        assert_eq!(form, vec![("name".to_string(), "Test User".to_string())]);

        let empty = SubscriberUpdateRequest {
            name: None,
            subscribed: None,
        };
        assert!(update_member_form(&empty).is_empty());
    }
}
