//! Request gate for signature-protected routes.
//!
//! Handlers for mutating routes call [`signature_gate`] first; a rejected
//! request never reaches handler logic or the provider. The gate keeps no
//! state between requests: a rejected attempt has no effect on the next one.

use crate::{
    config::SignatureConfig,
    models::{
        MessageResponse, SignatureAuditEvent, SignatureEventOutcome, SignatureEventType,
    },
    services::{metrics::AppMetrics, suspicious::SuspiciousActivityTracker},
    utils::{
        hmac::{VerifyError, verify_signature},
        http::{client_ip, user_agent},
    },
};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, warn};

pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Verify the request signature for `action`.
///
/// Returns the ready-to-send rejection response on failure so callers can
/// short-circuit with `?`-style early return. The wrapped handler must only
/// run on `Ok(())`.
pub fn signature_gate(
    req: &HttpRequest,
    action: &str,
    config: &SignatureConfig,
) -> Result<(), HttpResponse> {
    let timestamp_raw = header_str(req, TIMESTAMP_HEADER);
    let signature_raw = header_str(req, SIGNATURE_HEADER);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let outcome = verify_signature(
        config.secret.as_bytes(),
        action,
        &timestamp_raw,
        &signature_raw,
        now,
        config.timestamp_window_seconds,
    );

    if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
        let label = match &outcome {
            Ok(()) => "accepted",
            Err(e) => reason_label(e),
        };
        metrics.record_verification(action, label);
    }

    match outcome {
        Ok(()) => {
            debug!(action, "Signature verified");
            audit_event(req, action, SignatureEventType::SignatureAccepted, None).log();
            Ok(())
        }
        Err(reason) => Err(reject(req, action, reason, config)),
    }
}

/// [`signature_gate`] with the config taken from app data.
///
/// A missing `SignatureConfig` registration is treated exactly like an
/// unset secret: a protected route must never fall open because wiring
/// was forgotten.
pub fn require_signature(req: &HttpRequest, action: &str) -> Result<(), HttpResponse> {
    match req.app_data::<web::Data<SignatureConfig>>() {
        Some(config) => signature_gate(req, action, config),
        None => {
            error!(action, "Signature configuration missing from app data");
            Err(HttpResponse::InternalServerError()
                .json(MessageResponse::new("Authentication configuration error.")))
        }
    }
}

fn header_str(req: &HttpRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn reject(
    req: &HttpRequest,
    action: &str,
    reason: VerifyError,
    config: &SignatureConfig,
) -> HttpResponse {
    let ip = client_ip(req);

    // Full reason goes to logs and audit; the response body stays vaguer.
    match &reason {
        VerifyError::SecretNotConfigured => {
            error!(action, "API secret not configured on the server");
        }
        other => {
            warn!(action, ip = %ip, reason = %other, "Rejected signed request");
        }
    }

    audit_event(
        req,
        action,
        SignatureEventType::SignatureRejected,
        Some(reason.to_string()),
    )
    .log();

    // Repeated client-side failures from one address are worth flagging,
    // but never change the outcome of this or any later request.
    if !matches!(reason, VerifyError::SecretNotConfigured)
        && let Some(tracker) = req.app_data::<web::Data<SuspiciousActivityTracker>>()
        && tracker.record_failure(&ip)
    {
        warn!(ip = %ip, action, "Repeated signature failures from one address");
        audit_event(
            req,
            action,
            SignatureEventType::SuspiciousActivity,
            Some("repeated signature verification failures".to_string()),
        )
        .log();
    }

    rejection_response(&reason, config.timestamp_window_seconds)
}

/// Map an internal reason to the boundary status and body.
///
/// A missing secret is the server's fault (500); everything else is a 401.
/// None of the messages echo the expected signature or the received values.
fn rejection_response(reason: &VerifyError, window: u64) -> HttpResponse {
    match reason {
        VerifyError::SecretNotConfigured => HttpResponse::InternalServerError()
            .json(MessageResponse::new("Authentication configuration error.")),
        VerifyError::MissingHeaders => HttpResponse::Unauthorized().json(MessageResponse::new(
            "Missing required authentication headers (X-Timestamp, X-Signature).",
        )),
        VerifyError::MalformedTimestamp => {
            HttpResponse::Unauthorized().json(MessageResponse::new("Invalid timestamp format."))
        }
        VerifyError::TimestampOutOfWindow { .. } => HttpResponse::Unauthorized().json(
            MessageResponse::new(format!(
                "Timestamp expired or outside allowed window ({window}s)."
            )),
        ),
        VerifyError::SignatureMismatch => {
            HttpResponse::Unauthorized().json(MessageResponse::new("Invalid signature."))
        }
    }
}

fn reason_label(reason: &VerifyError) -> &'static str {
    match reason {
        VerifyError::SecretNotConfigured => "configuration_error",
        VerifyError::MissingHeaders => "missing_headers",
        VerifyError::MalformedTimestamp => "malformed_timestamp",
        VerifyError::TimestampOutOfWindow { .. } => "timestamp_out_of_window",
        VerifyError::SignatureMismatch => "signature_mismatch",
    }
}

fn audit_event(
    req: &HttpRequest,
    action: &str,
    event_type: SignatureEventType,
    reason: Option<String>,
) -> SignatureAuditEvent {
    let outcome = match event_type {
        SignatureEventType::SignatureAccepted => SignatureEventOutcome::Success,
        _ => SignatureEventOutcome::Failure,
    };

    let request_id = req.extensions().get::<String>().cloned();

    let mut event = SignatureAuditEvent::new(
        event_type,
        outcome,
        action,
        client_ip(req),
        req.method().to_string(),
        req.uri().path().to_string(),
    )
    .with_user_agent(user_agent(req))
    .with_request_id(request_id);

    if let Some(reason) = reason {
        event = event.with_reason(reason);
    }
    event
}
