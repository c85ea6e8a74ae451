//! Subscriber proxy endpoints.
//!
//! Each mutating route is bound to its own action identifier, so a
//! signature minted for one operation cannot authorize another. The gate
//! runs before the body is even parsed; provider responses are otherwise
//! passed through as-is.

use crate::{
    models::{MessageResponse, NewSubscriberRequest, SubscriberUpdateRequest},
    services::{
        auth::require_signature,
        mailing_list::{MailingListError, MailingListService},
    },
};
use actix_web::{Error, HttpRequest, HttpResponse, Result, http::StatusCode, web};
use paperclip::actix::api_v2_operation;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use tracing::{error, info};

pub const ACTION_SUBSCRIBE_ADD: &str = "subscribe-add";
pub const ACTION_SUBSCRIBE_UPDATE: &str = "subscribe-update";
pub const ACTION_SUBSCRIBE_DELETE: &str = "subscribe-delete";

/// List all subscribers of the configured mailing list.
#[api_v2_operation(
    summary = "List subscribers",
    description = "Returns all members of the configured mailing list as reported by the provider.",
    tags("Subscribers"),
    responses(
        (status = 200, description = "Provider member listing"),
        (status = 502, description = "Provider unreachable")
    )
)]
pub async fn list_subscribers(req: HttpRequest) -> Result<HttpResponse, Error> {
    info!("Received request to list subscribers");
    let service = mailing_list(&req)?;
    Ok(provider_response(service.list_members().await, false))
}

/// Create (or upsert) a subscriber. Protected by the `subscribe-add` action.
#[api_v2_operation(
    summary = "Create subscriber",
    description = "Adds a member to the mailing list (or updates it when upsert is set). \
        Requires X-Timestamp and X-Signature headers; the signature is HMAC-SHA256 over \
        the timestamp string followed by \"subscribe-add\". Body fields (JSON or form): \
        address (required), name, subscribed, upsert.",
    tags("Subscribers"),
    responses(
        (status = 200, description = "Subscriber added or updated"),
        (status = 400, description = "Input validation error"),
        (status = 401, description = "Timestamp or signature invalid"),
        (status = 500, description = "Authentication configuration error"),
        (status = 502, description = "Provider unreachable")
    )
)]
pub async fn create_subscriber(req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, Error> {
    if let Err(response) = require_signature(&req, ACTION_SUBSCRIBE_ADD) {
        return Ok(response);
    }

    let request: NewSubscriberRequest = match parse_body(&req, &body) {
        Ok(request) => request,
        Err(response) => return Ok(response),
    };

    if request.address.trim().is_empty() {
        return Ok(bad_request("Email address cannot be blank."));
    }
    if !address_looks_valid(&request.address) {
        return Ok(bad_request("Invalid email address format."));
    }

    info!(address = %request.address, "Received request to add/update subscriber");
    let service = mailing_list(&req)?;
    Ok(provider_response(service.add_member(&request).await, false))
}

/// Fetch a single subscriber by address.
#[api_v2_operation(
    summary = "Get subscriber",
    description = "Returns a single mailing-list member by email address.",
    tags("Subscribers"),
    responses(
        (status = 200, description = "Provider member record"),
        (status = 404, description = "Subscriber not found"),
        (status = 502, description = "Provider unreachable")
    )
)]
pub async fn get_subscriber(
    req: HttpRequest,
    address: web::Path<String>,
) -> Result<HttpResponse, Error> {
    info!(address = %address, "Received request to get subscriber");
    let service = mailing_list(&req)?;
    Ok(provider_response(service.get_member(&address).await, true))
}

/// Update a subscriber. Protected by the `subscribe-update` action.
#[api_v2_operation(
    summary = "Update subscriber",
    description = "Updates the name and/or subscription status of a member. Requires \
        X-Timestamp and X-Signature headers; the signature is HMAC-SHA256 over the \
        timestamp string followed by \"subscribe-update\". Body fields (JSON or form): \
        name, subscribed.",
    tags("Subscribers"),
    responses(
        (status = 200, description = "Subscriber updated"),
        (status = 400, description = "No update data provided"),
        (status = 401, description = "Timestamp or signature invalid"),
        (status = 404, description = "Subscriber not found"),
        (status = 500, description = "Authentication configuration error"),
        (status = 502, description = "Provider unreachable")
    )
)]
pub async fn update_subscriber(
    req: HttpRequest,
    address: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    if let Err(response) = require_signature(&req, ACTION_SUBSCRIBE_UPDATE) {
        return Ok(response);
    }

    let update: SubscriberUpdateRequest = match parse_body(&req, &body) {
        Ok(update) => update,
        Err(response) => return Ok(response),
    };

    if update.is_empty() {
        return Ok(bad_request(
            "No update data provided. Provide 'name' or 'subscribed'.",
        ));
    }

    info!(address = %address, "Received request to update subscriber");
    let service = mailing_list(&req)?;
    Ok(provider_response(
        service.update_member(&address, &update).await,
        true,
    ))
}

/// Delete a subscriber. Protected by the `subscribe-delete` action.
#[api_v2_operation(
    summary = "Delete subscriber",
    description = "Removes a member from the mailing list. Requires X-Timestamp and \
        X-Signature headers; the signature is HMAC-SHA256 over the timestamp string \
        followed by \"subscribe-delete\".",
    tags("Subscribers"),
    responses(
        (status = 200, description = "Subscriber deleted"),
        (status = 401, description = "Timestamp or signature invalid"),
        (status = 404, description = "Subscriber not found"),
        (status = 500, description = "Authentication configuration error"),
        (status = 502, description = "Provider unreachable")
    )
)]
pub async fn delete_subscriber(
    req: HttpRequest,
    address: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Err(response) = require_signature(&req, ACTION_SUBSCRIBE_DELETE) {
        return Ok(response);
    }

    info!(address = %address, "Received request to delete subscriber");
    let service = mailing_list(&req)?;
    Ok(provider_response(service.delete_member(&address).await, true))
}

fn mailing_list(req: &HttpRequest) -> Result<&web::Data<MailingListService>, Error> {
    req.app_data::<web::Data<MailingListService>>().ok_or_else(|| {
        error!("Mailing list service missing from app data");
        actix_web::error::ErrorInternalServerError("Mailing list service unavailable")
    })
}

/// Decode the request body as form data or JSON, depending on content type.
///
/// Parsing happens after the signature gate on purpose: an unauthenticated
/// caller learns nothing about what the body should look like.
fn parse_body<T: DeserializeOwned>(req: &HttpRequest, body: &web::Bytes) -> Result<T, HttpResponse> {
    let content_type = req
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let parsed = if content_type.starts_with("application/x-www-form-urlencoded") {
        serde_urlencoded::from_bytes(body).map_err(|e| e.to_string())
    } else {
        serde_json::from_slice(body).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| bad_request(format!("Invalid request body: {e}")))
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(MessageResponse::new(message))
}

/// Translate a provider call result into the boundary response.
///
/// Success bodies pass through verbatim. Provider error statuses are
/// forwarded with the provider's message; transport failures become a 502
/// with a user-safe message.
fn provider_response(
    result: Result<serde_json::Value, MailingListError>,
    member_route: bool,
) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(MailingListError::Provider { status: 404, .. }) if member_route => {
            HttpResponse::NotFound().json(MessageResponse::new("Member not found"))
        }
        Err(MailingListError::Provider { status, message }) => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(MessageResponse::new(message))
        }
        Err(MailingListError::Transport(e)) => {
            HttpResponse::BadGateway().json(MessageResponse::new(e.user_message()))
        }
        Err(MailingListError::Decode(e)) => {
            error!(error = %e, "Provider returned an undecodable body");
            HttpResponse::BadGateway().json(MessageResponse::new(
                "Invalid response from mailing list provider",
            ))
        }
    }
}

fn address_looks_valid(address: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern"));
    re.is_match(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_sanity_check() {
        assert!(address_looks_valid("user@example.com"));
        assert!(address_looks_valid("user.name+tag@lists.example.co.uk"));
        assert!(!address_looks_valid("not-an-address"));
        assert!(!address_looks_valid("user@@example.com"));
        assert!(!address_looks_valid("user @example.com"));
        assert!(!address_looks_valid("user@nodot"));
    }

    #[test]
    fn body_parsing_by_content_type() {
        use actix_web::test::TestRequest;

        let json_req = TestRequest::default()
            .insert_header(("Content-Type", "application/json"))
            .to_http_request();
        let parsed: NewSubscriberRequest = parse_body(
            &json_req,
            &web::Bytes::from_static(br#"{"address":"user@example.com"}"#),
        )
        .unwrap();
        assert_eq!(parsed.address, "user@example.com");

        let form_req = TestRequest::default()
            .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
            .to_http_request();
        let parsed: NewSubscriberRequest = parse_body(
            &form_req,
            &web::Bytes::from_static(b"address=user%40example.com&subscribed=true"),
        )
        .unwrap();
        assert_eq!(parsed.address, "user@example.com");
        assert_eq!(parsed.subscribed, Some(true));
    }
}
