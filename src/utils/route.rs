//! Route labels for metrics.

use actix_web::HttpRequest;

/// Metric label for the matched route.
///
/// Uses the route pattern (`/api/v1/mail-list/subscribers/{address}`) rather
/// than the concrete path so per-subscriber paths don't explode label
/// cardinality. Unmatched requests are grouped under one label.
pub fn route_label(req: &HttpRequest) -> String {
    req.match_pattern()
        .unwrap_or_else(|| "unmatched".to_string())
}
