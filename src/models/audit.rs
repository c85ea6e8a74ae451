//! Structured audit events for signature verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Types of signature events for audit logging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureEventType {
    SignatureAccepted,
    SignatureRejected,
    SuspiciousActivity,
}

/// Outcomes of signature events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureEventOutcome {
    Success,
    Failure,
}

/// One audit record per verification decision.
///
/// The internal `reason` is logged here in full; the HTTP response carries
/// a less specific message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureAuditEvent {
    pub event_type: SignatureEventType,
    pub outcome: SignatureEventOutcome,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub method: String,
    pub endpoint: String,
    pub reason: Option<String>,
    pub request_id: Option<String>,
}

impl SignatureAuditEvent {
    pub fn new(
        event_type: SignatureEventType,
        outcome: SignatureEventOutcome,
        action: impl Into<String>,
        ip_address: String,
        method: String,
        endpoint: String,
    ) -> Self {
        Self {
            event_type,
            outcome,
            timestamp: Utc::now(),
            action: action.into(),
            ip_address,
            user_agent: None,
            method,
            endpoint,
            reason: None,
            request_id: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Emit the event through structured logging.
    pub fn log(&self) {
        info!(
            target: "signature_audit",
            event_type = ?self.event_type,
            outcome = ?self.outcome,
            timestamp = %self.timestamp,
            action = %self.action,
            ip_address = %self.ip_address,
            user_agent = ?self.user_agent,
            method = %self.method,
            endpoint = %self.endpoint,
            reason = ?self.reason,
            request_id = ?self.request_id,
            "Signature audit event"
        );
    }
}
