use actix_web::HttpServer;
use mailgate_api::{MailingListConfig, SignatureConfig, create_base_app};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Provider credentials are load-bearing; refuse to start without them.
    let mailing_config = MailingListConfig::from_env();
    if let Err(e) = mailing_config.validate() {
        return Err(std::io::Error::other(format!(
            "invalid mailing list configuration: {e}"
        )));
    }

    let signature_config = SignatureConfig::from_env();
    if signature_config.secret.is_empty() {
        // Not fatal: public routes still work, protected routes answer 500.
        tracing::warn!("API_SECRET is not set; mutating routes will reject all requests");
    }

    tracing::info!(
        list_address = %mailing_config.list_address,
        timestamp_window_seconds = signature_config.timestamp_window_seconds,
        "Server running at http://127.0.0.1:8080"
    );

    HttpServer::new(create_base_app)
        .bind("127.0.0.1:8080")?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use mailgate_api::{health, version};

    #[actix_web::test]
    async fn test_health() {
        let app =
            test::init_service(App::new().route("/api/health", web::get().to(health))).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let body_str = std::str::from_utf8(&body).unwrap();
        assert!(body_str.contains("healthy"));
    }

    #[actix_web::test]
    async fn test_version() {
        let app =
            test::init_service(App::new().route("/api/version", web::get().to(version))).await;

        let req = test::TestRequest::get().uri("/api/version").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let body_str = std::str::from_utf8(&body).unwrap();
        assert!(body_str.contains("version"));
        assert!(body_str.contains("commit"));
        assert!(body_str.contains("build_time"));
    }
}
