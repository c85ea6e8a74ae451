//! Data models and schemas for the Mailgate API.

pub mod api;
pub mod audit;
pub mod subscriber;

pub use api::*;
pub use audit::*;
pub use subscriber::*;
