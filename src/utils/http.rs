//! HTTP helpers for pulling client details out of a request.

use actix_web::HttpRequest;

/// Best-effort client IP, preferring proxy headers over the socket address.
///
/// `X-Forwarded-For` may carry a comma-separated chain; the first entry is
/// the originating client.
pub fn client_ip(req: &HttpRequest) -> String {
    for header in ["X-Forwarded-For", "X-Real-IP"] {
        if let Some(value) = req.headers().get(header).and_then(|h| h.to_str().ok()) {
            let ip = value.split(',').next().unwrap_or(value).trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    req.connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// The request's `User-Agent` header, if it is valid ASCII.
pub fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
