//! Utility functions and helper modules.

pub mod hmac;
pub mod http;
pub mod route;

pub use http::*;
pub use route::*;
