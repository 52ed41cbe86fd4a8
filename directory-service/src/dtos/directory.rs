use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{LocationChanges, NewLocation, NewStore, StoreChanges};
use crate::services::ServiceError;

/// Absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required(field: &str, value: Option<String>) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::ValidationError(format!("{} is required", field))),
    }
}

fn non_empty(field: &str, value: Option<String>) -> Result<Option<String>, ServiceError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ServiceError::ValidationError(format!(
            "{} must not be empty",
            field
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    #[schema(example = "Downtown")]
    pub name: Option<String>,
    #[schema(example = "City centre, around the main square")]
    pub description: Option<String>,
}

impl TryFrom<CreateLocationRequest> for NewLocation {
    type Error = ServiceError;

    fn try_from(req: CreateLocationRequest) -> Result<Self, Self::Error> {
        Ok(NewLocation {
            name: required("Name", req.name)?,
            description: required("Description", req.description)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<UpdateLocationRequest> for LocationChanges {
    type Error = ServiceError;

    fn try_from(req: UpdateLocationRequest) -> Result<Self, Self::Error> {
        Ok(LocationChanges {
            name: non_empty("Name", req.name)?,
            description: non_empty("Description", req.description)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateStoreRequest {
    #[schema(example = "Corner Shop")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = 1)]
    pub location_id: Option<i64>,
}

impl TryFrom<CreateStoreRequest> for NewStore {
    type Error = ServiceError;

    fn try_from(req: CreateStoreRequest) -> Result<Self, Self::Error> {
        Ok(NewStore {
            name: required("Name", req.name)?,
            description: req.description,
            location_id: req.location_id,
        })
    }
}

/// `null` clears `description` or `location_id`; an absent key leaves it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub location_id: Option<Option<i64>>,
}

impl TryFrom<UpdateStoreRequest> for StoreChanges {
    type Error = ServiceError;

    fn try_from(req: UpdateStoreRequest) -> Result<Self, Self::Error> {
        Ok(StoreChanges {
            name: non_empty("Name", req.name)?,
            description: req.description,
            location_id: req.location_id,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
