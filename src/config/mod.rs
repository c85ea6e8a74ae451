//! Configuration structures and environment loading.
//!
//! Each concern gets its own config struct with `Default` values and a
//! `from_env()` loader. Configs are injected into the app as `web::Data`
//! rather than read ambiently, so tests can run with explicit values.

pub mod mailing_list;
pub mod metrics;
pub mod security;
pub mod signature;
pub mod upstream;

pub use mailing_list::*;
pub use metrics::*;
pub use security::*;
pub use signature::*;
