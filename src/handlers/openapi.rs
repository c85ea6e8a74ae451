//! OpenAPI specification and app factory.

use crate::{
    config::{
        MailingListConfig, MetricsConfig, SecurityHeadersConfig, SignatureConfig,
    },
    handlers::{
        create_subscriber, delete_subscriber, get_metrics, get_subscriber, health,
        list_subscribers, update_subscriber, version,
    },
    middleware::{MetricsMiddleware, RequestIdMiddleware, SecurityHeaders},
    services::{
        mailing_list::MailingListService,
        metrics::AppMetrics,
        suspicious::SuspiciousActivityTracker,
        upstream::{UpstreamClient, UpstreamClientConfig, UpstreamMetrics},
    },
};
use actix_web::{App, HttpResponse};
use paperclip::actix::{OpenApiExt, api_v2_operation, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Mailgate API</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 0; background: #f5f5f5; color: #333; }
        .container { max-width: 800px; margin: 40px auto; padding: 20px; background: #fff;
                     box-shadow: 0 2px 8px rgba(0,0,0,0.1); border-radius: 8px; }
        h1 { text-align: center; }
        pre { background: #eee; padding: 20px; border-radius: 4px; overflow-x: auto; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Mailgate API</h1>
        <p>Mailing-list subscriber proxy. Mutating routes require a signed request;
           see the OpenAPI document below for the signing scheme.</p>
        <pre id="openapi">Loading...</pre>
    </div>
    <script>
        fetch('/api/spec/v2')
            .then(response => response.json())
            .then(data => {
                document.getElementById('openapi').textContent = JSON.stringify(data, null, 2);
            })
            .catch(error => {
                document.getElementById('openapi').textContent = 'Error loading spec: ' + error;
            });
    </script>
</body>
</html>"#;

#[api_v2_operation(
    summary = "Index Page",
    description = "Landing page with a rendered copy of the OpenAPI document.",
    tags("Index"),
    responses(
        (status = 200, description = "Successful response")
    )
)]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body(INDEX_HTML)
}

/// Creates the shared OpenAPI specification for the API
///
/// The description doubles as the client-facing documentation of the
/// request-signing scheme.
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Mailgate API".into(),
            version: "1.0.0".into(),
            description: Some(
                "HTTP facade for managing the subscribers of a single mailing list.\n\n\
                ## Request signing\n\
                Mutating routes (POST, PUT, DELETE) require a signed request:\n\
                \n\
                **Headers:**\n\
                - `X-Timestamp`: Unix timestamp in seconds, as a decimal string\n\
                - `X-Signature`: lowercase hex HMAC-SHA256 digest (64 characters)\n\
                \n\
                **Signature calculation:**\n\
                1. Create the message: the timestamp string immediately followed by the \
                action identifier (no separator)\n\
                2. Compute HMAC-SHA256 over the message with the shared secret\n\
                3. Hex-encode the digest (lowercase)\n\
                \n\
                **Action identifiers:**\n\
                - `subscribe-add` for POST /api/v1/mail-list/subscribers\n\
                - `subscribe-update` for PUT /api/v1/mail-list/subscribers/{address}\n\
                - `subscribe-delete` for DELETE /api/v1/mail-list/subscribers/{address}\n\
                \n\
                Timestamps are accepted within a symmetric window around server time \
                (default 300 seconds); outside it the signature is rejected even if \
                otherwise valid.\n\
                \n\
                **Configuration:**\n\
                - `API_SECRET` sets the shared secret\n\
                - `SIGNATURE_TIMESTAMP_WINDOW` adjusts the replay window in seconds"
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the application with shared configuration
///
/// Pre-configured Actix Web application with:
/// - Subscriber proxy routes (mutating ones behind the signature gate)
/// - Health, version, and metrics endpoints
/// - OpenAPI specification
/// - Request IDs, security headers, metrics collection
///
/// Used both by `main` and by integration tests.
pub fn create_base_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let signature_config = SignatureConfig::from_env();
    let mailing_config = MailingListConfig::from_env();
    let security_config = SecurityHeadersConfig::from_env();
    let metrics_config = MetricsConfig::from_env();
    let metrics = AppMetrics::new().expect("Failed to create metrics");
    let upstream_metrics = UpstreamMetrics::new(&metrics.registry)
        .expect("Failed to register upstream metrics");
    let upstream = UpstreamClient::new(UpstreamClientConfig::from_env(), Some(upstream_metrics))
        .expect("Failed to create upstream HTTP client");
    let mailing_list = MailingListService::new(mailing_config, upstream);
    let activity_tracker = SuspiciousActivityTracker::new();

    App::new()
        .wrap(SecurityHeaders::new(security_config))
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(web::Data::new(signature_config))
        .app_data(web::Data::new(metrics_config))
        .app_data(web::Data::new(metrics))
        .app_data(web::Data::new(mailing_list))
        .app_data(web::Data::new(activity_tracker))
        .service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .service(
            web::resource("/api/v1/mail-list/subscribers")
                .route(web::get().to(list_subscribers))
                .route(web::post().to(create_subscriber)),
        )
        .service(
            web::resource("/api/v1/mail-list/subscribers/{address}")
                .route(web::get().to(get_subscriber))
                .route(web::put().to(update_subscriber))
                .route(web::delete().to(delete_subscriber)),
        )
        .with_json_spec_at("/api/spec/v2")
        .build()
}
