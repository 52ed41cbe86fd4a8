//! Persistence seams. Handlers and services only see these traits; the
//! backend (in-memory or PostgreSQL) is chosen at startup.

use async_trait::async_trait;

use crate::models::{
    Location, LocationChanges, NewLocation, NewStore, NewUserRecord, StoreChanges, StoreRecord,
    User, UserRecordChanges,
};
use crate::services::ServiceError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `EmailAlreadyRegistered` if the email is taken.
    async fn insert(&self, user: NewUserRecord) -> Result<User, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError>;
    async fn list(&self) -> Result<Vec<User>, ServiceError>;
    /// Fails with `UserNotFound` or `EmailAlreadyRegistered`.
    async fn update(&self, id: i64, changes: UserRecordChanges) -> Result<User, ServiceError>;
    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: NewLocation) -> Result<Location, ServiceError>;
    async fn get(&self, id: i64) -> Result<Option<Location>, ServiceError>;
    async fn list(&self) -> Result<Vec<Location>, ServiceError>;
    async fn update(
        &self,
        id: i64,
        changes: LocationChanges,
    ) -> Result<Option<Location>, ServiceError>;
    /// Returns whether a row was removed. Stores pointing at it are detached.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Fails with `UnknownLocation` if `location_id` names no location.
    async fn create(&self, store: NewStore) -> Result<StoreRecord, ServiceError>;
    async fn get(&self, id: i64) -> Result<Option<StoreRecord>, ServiceError>;
    async fn list(&self) -> Result<Vec<StoreRecord>, ServiceError>;
    async fn update(
        &self,
        id: i64,
        changes: StoreChanges,
    ) -> Result<Option<StoreRecord>, ServiceError>;
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}
