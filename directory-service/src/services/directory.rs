use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    Location, LocationChanges, NewLocation, NewStore, Store, StoreChanges, StoreRecord,
};
use crate::services::{LocationRepository, ServiceError, StoreRepository};

/// Location and store management. Stores are always returned with their
/// location resolved.
#[derive(Clone)]
pub struct DirectoryService {
    locations: Arc<dyn LocationRepository>,
    stores: Arc<dyn StoreRepository>,
}

impl DirectoryService {
    pub fn new(locations: Arc<dyn LocationRepository>, stores: Arc<dyn StoreRepository>) -> Self {
        Self { locations, stores }
    }

    // ==================== Locations ====================

    pub async fn create_location(&self, location: NewLocation) -> Result<Location, ServiceError> {
        let location = self.locations.create(location).await?;
        tracing::info!(location_id = location.id, "Location created");
        Ok(location)
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>, ServiceError> {
        self.locations.list().await
    }

    pub async fn get_location(&self, id: i64) -> Result<Location, ServiceError> {
        self.locations
            .get(id)
            .await?
            .ok_or(ServiceError::LocationNotFound)
    }

    pub async fn update_location(
        &self,
        id: i64,
        changes: LocationChanges,
    ) -> Result<Location, ServiceError> {
        self.locations
            .update(id, changes)
            .await?
            .ok_or(ServiceError::LocationNotFound)
    }

    pub async fn delete_location(&self, id: i64) -> Result<(), ServiceError> {
        if !self.locations.delete(id).await? {
            return Err(ServiceError::LocationNotFound);
        }
        tracing::info!(location_id = id, "Location deleted");
        Ok(())
    }

    // ==================== Stores ====================

    pub async fn create_store(&self, store: NewStore) -> Result<Store, ServiceError> {
        let record = self.stores.create(store).await?;
        tracing::info!(store_id = record.id, "Store created");
        self.resolve(record).await
    }

    pub async fn list_stores(&self) -> Result<Vec<Store>, ServiceError> {
        let records = self.stores.list().await?;
        let locations: HashMap<i64, Location> = self
            .locations
            .list()
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| {
                let location = record
                    .location_id
                    .and_then(|id| locations.get(&id).cloned());
                Store::from_record(record, location)
            })
            .collect())
    }

    pub async fn get_store(&self, id: i64) -> Result<Store, ServiceError> {
        let record = self
            .stores
            .get(id)
            .await?
            .ok_or(ServiceError::StoreNotFound)?;
        self.resolve(record).await
    }

    pub async fn update_store(&self, id: i64, changes: StoreChanges) -> Result<Store, ServiceError> {
        let record = self
            .stores
            .update(id, changes)
            .await?
            .ok_or(ServiceError::StoreNotFound)?;
        self.resolve(record).await
    }

    pub async fn delete_store(&self, id: i64) -> Result<(), ServiceError> {
        if !self.stores.delete(id).await? {
            return Err(ServiceError::StoreNotFound);
        }
        tracing::info!(store_id = id, "Store deleted");
        Ok(())
    }

    async fn resolve(&self, record: StoreRecord) -> Result<Store, ServiceError> {
        let location = match record.location_id {
            Some(id) => self.locations.get(id).await?,
            None => None,
        };
        Ok(Store::from_record(record, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryDatabase;

    fn service() -> DirectoryService {
        let db = Arc::new(MemoryDatabase::new());
        DirectoryService::new(db.clone(), db)
    }

    fn downtown() -> NewLocation {
        NewLocation {
            name: "Downtown".to_string(),
            description: "Centre".to_string(),
        }
    }

    #[tokio::test]
    async fn store_embeds_its_location() {
        let svc = service();
        let location = svc.create_location(downtown()).await.unwrap();

        let store = svc
            .create_store(NewStore {
                name: "Shop".to_string(),
                description: None,
                location_id: Some(location.id),
            })
            .await
            .unwrap();

        assert_eq!(store.location, Some(location.clone()));
        let listed = svc.list_stores().await.unwrap();
        assert_eq!(listed[0].location, Some(location));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let svc = service();

        assert!(matches!(
            svc.get_location(1).await.unwrap_err(),
            ServiceError::LocationNotFound
        ));
        assert!(matches!(
            svc.delete_store(1).await.unwrap_err(),
            ServiceError::StoreNotFound
        ));
        assert!(matches!(
            svc.update_store(1, StoreChanges::default()).await.unwrap_err(),
            ServiceError::StoreNotFound
        ));
    }

    #[tokio::test]
    async fn update_moves_store_between_locations() {
        let svc = service();
        let first = svc.create_location(downtown()).await.unwrap();
        let second = svc
            .create_location(NewLocation {
                name: "Harbour".to_string(),
                description: "Waterfront".to_string(),
            })
            .await
            .unwrap();
        let store = svc
            .create_store(NewStore {
                name: "Shop".to_string(),
                description: None,
                location_id: Some(first.id),
            })
            .await
            .unwrap();

        let moved = svc
            .update_store(
                store.id,
                StoreChanges {
                    location_id: Some(Some(second.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.location_id, Some(second.id));
        assert_eq!(moved.location.map(|l| l.name), Some("Harbour".to_string()));
    }
}
