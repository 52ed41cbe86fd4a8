use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        directory::{CreateLocationRequest, UpdateLocationRequest},
        MessageResponse,
    },
    models::{LocationChanges, NewLocation},
    utils::ValidatedJson,
    AppState,
};

/// Create a location
#[utoipa::path(
    post,
    path = "/location",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = crate::models::Location),
        (status = 400, description = "Missing name or description", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::dtos::ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn create_location(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let location = state
        .directory_service
        .create_location(NewLocation::try_from(req)?)
        .await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// List locations
#[utoipa::path(
    get,
    path = "/location",
    responses(
        (status = 200, description = "All locations", body = [crate::models::Location]),
        (status = 401, description = "Missing or invalid token", body = crate::dtos::ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn list_locations(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.directory_service.list_locations().await?))
}

/// Get a location by id
#[utoipa::path(
    get,
    path = "/location/{id}",
    params(("id" = i64, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location", body = crate::models::Location),
        (status = 404, description = "Location not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.directory_service.get_location(id).await?))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/location/{id}",
    params(("id" = i64, Path, description = "Location id")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Updated location", body = crate::models::Location),
        (status = 400, description = "Empty name or description", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Location not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let location = state
        .directory_service
        .update_location(id, LocationChanges::try_from(req)?)
        .await?;
    Ok(Json(location))
}

/// Delete a location; its stores are kept but detached
#[utoipa::path(
    delete,
    path = "/location/{id}",
    params(("id" = i64, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location deleted", body = MessageResponse),
        (status = 404, description = "Location not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.directory_service.delete_location(id).await?;
    Ok(Json(MessageResponse::new("Location deleted")))
}
