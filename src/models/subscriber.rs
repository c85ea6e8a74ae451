//! Subscriber request and documentation models.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Body of a create-subscriber request.
///
/// Accepted as JSON or form data. `subscribed` and `upsert` default to true
/// when omitted, mirroring the provider's behavior.
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct NewSubscriberRequest {
    /// Email address of the subscriber
    pub address: String,
    /// Optional display name
    pub name: Option<String>,
    /// Subscription status (default: true)
    pub subscribed: Option<bool>,
    /// Update the member if it already exists (default: true)
    pub upsert: Option<bool>,
}

/// Body of an update-subscriber request. At least one field must be set.
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SubscriberUpdateRequest {
    /// Optional display name
    pub name: Option<String>,
    /// Subscription status
    pub subscribed: Option<bool>,
}

impl SubscriberUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.subscribed.is_none()
    }
}

/// Documentation model for a single list member.
///
/// Provider responses are passed through verbatim; this shape exists for
/// the OpenAPI document rather than for deserialization.
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct Subscriber {
    /// Email address of the subscriber
    pub address: String,
    /// Name of the subscriber
    pub name: Option<String>,
    /// Subscription status
    pub subscribed: bool,
}
