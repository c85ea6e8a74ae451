//! Business logic and core services.

pub mod auth;
pub mod mailing_list;
pub mod metrics;
pub mod suspicious;
pub mod upstream;

pub use auth::*;
pub use mailing_list::*;
pub use metrics::*;
pub use suspicious::*;
pub use upstream::*;
