use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A physical location that stores can be attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Downtown")]
    pub name: String,
    #[schema(example = "City centre, around the main square")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl LocationChanges {
    pub fn apply(self, location: &mut Location, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            location.name = name;
        }
        if let Some(description) = self.description {
            location.description = description;
        }
        location.updated_at = now;
    }
}
