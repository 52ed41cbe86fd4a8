//! In-memory persistence backend, used when no DATABASE_URL is configured
//! and throughout the tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{
    Location, LocationChanges, NewLocation, NewStore, NewUserRecord, StoreChanges, StoreRecord,
    User, UserRecordChanges,
};
use crate::services::{LocationRepository, ServiceError, StoreRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    locations: BTreeMap<i64, Location>,
    stores: BTreeMap<i64, StoreRecord>,
    next_user_id: i64,
    next_location_id: i64,
    next_store_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn check_location(&self, location_id: Option<i64>) -> Result<(), ServiceError> {
        match location_id {
            Some(id) if !self.locations.contains_key(&id) => Err(ServiceError::UnknownLocation(id)),
            _ => Ok(()),
        }
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// All three tables behind one lock, so cross-table rules (unique email,
/// store → location reference) hold without extra coordination.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn insert(&self, user: NewUserRecord) -> Result<User, ServiceError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let now = Utc::now();
        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: UserRecordChanges) -> Result<User, ServiceError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(ServiceError::EmailAlreadyRegistered);
            }
        }

        let user = tables.users.get_mut(&id).ok_or(ServiceError::UserNotFound)?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for MemoryDatabase {
    async fn create(&self, location: NewLocation) -> Result<Location, ServiceError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let id = next_id(&mut tables.next_location_id);
        let location = Location {
            id,
            name: location.name,
            description: location.description,
            created_at: now,
            updated_at: now,
        };
        tables.locations.insert(id, location.clone());
        Ok(location)
    }

    async fn get(&self, id: i64) -> Result<Option<Location>, ServiceError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Location>, ServiceError> {
        Ok(self.tables.read().await.locations.values().cloned().collect())
    }

    async fn update(
        &self,
        id: i64,
        changes: LocationChanges,
    ) -> Result<Option<Location>, ServiceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.locations.get_mut(&id).map(|location| {
            changes.apply(location, Utc::now());
            location.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let mut tables = self.tables.write().await;
        if tables.locations.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for store in tables.stores.values_mut() {
            if store.location_id == Some(id) {
                store.location_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl StoreRepository for MemoryDatabase {
    async fn create(&self, store: NewStore) -> Result<StoreRecord, ServiceError> {
        let mut tables = self.tables.write().await;
        tables.check_location(store.location_id)?;

        let now = Utc::now();
        let id = next_id(&mut tables.next_store_id);
        let record = StoreRecord {
            id,
            name: store.name,
            description: store.description,
            location_id: store.location_id,
            created_at: now,
            updated_at: now,
        };
        tables.stores.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<StoreRecord>, ServiceError> {
        Ok(self.tables.read().await.stores.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<StoreRecord>, ServiceError> {
        Ok(self.tables.read().await.stores.values().cloned().collect())
    }

    async fn update(
        &self,
        id: i64,
        changes: StoreChanges,
    ) -> Result<Option<StoreRecord>, ServiceError> {
        let mut tables = self.tables.write().await;
        if let Some(location_id) = changes.location_id {
            tables.check_location(location_id)?;
        }
        Ok(tables.stores.get_mut(&id).map(|store| {
            changes.apply(store, Utc::now());
            store.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.tables.write().await.stores.remove(&id).is_some())
    }
}
