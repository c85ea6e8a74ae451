//! Mailgate API - an HTTP facade for one mailing list.
//!
//! Proxies CRUD operations on the subscribers of a single provider-hosted
//! mailing list. Mutating routes are protected by a time-boxed HMAC request
//! signature: clients sign `timestamp + action` with a shared secret and
//! send the digest in a header, and the gate verifies it before any handler
//! logic or provider traffic happens.
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `models/` - Data structures and request/response models
//! - `handlers/` - HTTP request handlers for each endpoint
//! - `middleware/` - Custom middleware for cross-cutting concerns
//! - `services/` - Signature gate, provider client, metrics
//! - `utils/` - Signature primitives and request helpers
//! - `config/` - Configuration structures and environment loading
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailgate_api::create_base_app;
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let app = create_base_app();
//!     // Configure and run the server
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{MailingListConfig, MetricsConfig, SecurityHeadersConfig, SignatureConfig};
pub use handlers::{
    create_base_app, create_openapi_spec, create_subscriber, delete_subscriber, get_metrics,
    get_subscriber, health, index, list_subscribers, update_subscriber, version,
};
pub use middleware::{MetricsMiddleware, RequestIdMiddleware, SecurityHeaders};
pub use models::{
    HealthResponse, MessageResponse, NewSubscriberRequest, SignatureAuditEvent,
    SignatureEventOutcome, SignatureEventType, Subscriber, SubscriberUpdateRequest,
    VersionResponse,
};
pub use services::{
    AppMetrics, MailingListError, MailingListService, SuspiciousActivityTracker, UpstreamClient,
    UpstreamClientConfig, UpstreamError, UpstreamMetrics, require_signature, signature_gate,
};
pub use utils::hmac as hmac_utils;
pub use utils::hmac::{VerifyError, sign_action, verify_signature};
