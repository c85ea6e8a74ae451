//! HTTP request handlers for API endpoints.

pub mod health;
pub mod metrics;
pub mod openapi;
pub mod subscribers;
pub mod version;

pub use health::*;
pub use metrics::*;
pub use openapi::*;
pub use subscribers::*;
pub use version::*;
