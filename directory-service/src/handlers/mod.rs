//! HTTP handlers for directory-service.

pub mod auth;
pub mod location;
pub mod metrics;
pub mod store;
pub mod user;

pub use auth::*;
pub use location::*;
pub use store::*;
pub use user::*;
