//! Services layer for directory-service.
//!
//! Business logic for authentication and the location/store directory,
//! plus the persistence and refresh-token backends behind their traits.

mod auth;
mod credentials;
mod database;
mod directory;
pub mod error;
mod jwt;
mod memory;
pub mod metrics;
pub mod redis;
mod registry;
mod repository;

pub use auth::AuthService;
pub use credentials::CredentialStore;
pub use database::Database;
pub use directory::DirectoryService;
pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims};
pub use memory::MemoryDatabase;
pub use redis::RedisRegistry;
pub use registry::{spawn_registry_sweeper, InMemoryRegistry, RefreshTokenRegistry};
pub use repository::{LocationRepository, StoreRepository, UserRepository};
