use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Location;

/// A store row as persisted; `location_id` is a nullable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A store as returned to clients, with its location resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Corner Shop")]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "location_id")]
    pub location_id: Option<i64>,
    pub location: Option<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn from_record(record: StoreRecord, location: Option<Location>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            location_id: record.location_id,
            location,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub description: Option<String>,
    pub location_id: Option<i64>,
}

/// Partial update. The outer `Option` is "field present in the request";
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub location_id: Option<Option<i64>>,
}

impl StoreChanges {
    pub fn apply(self, store: &mut StoreRecord, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            store.name = name;
        }
        if let Some(description) = self.description {
            store.description = description;
        }
        if let Some(location_id) = self.location_id {
            store.location_id = location_id;
        }
        store.updated_at = now;
    }
}
