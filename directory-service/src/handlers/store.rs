use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        directory::{CreateStoreRequest, UpdateStoreRequest},
        MessageResponse,
    },
    models::{NewStore, StoreChanges},
    utils::ValidatedJson,
    AppState,
};

/// Create a store
#[utoipa::path(
    post,
    path = "/store",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = crate::models::Store),
        (status = 400, description = "Missing name or unknown location", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::dtos::ErrorResponse)
    ),
    tag = "Stores",
    security(("bearer_auth" = []))
)]
pub async fn create_store(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = state
        .directory_service
        .create_store(NewStore::try_from(req)?)
        .await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// List stores
#[utoipa::path(
    get,
    path = "/store",
    responses(
        (status = 200, description = "All stores", body = [crate::models::Store]),
        (status = 401, description = "Missing or invalid token", body = crate::dtos::ErrorResponse)
    ),
    tag = "Stores",
    security(("bearer_auth" = []))
)]
pub async fn list_stores(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.directory_service.list_stores().await?))
}

/// Get a store by id
#[utoipa::path(
    get,
    path = "/store/{id}",
    params(("id" = i64, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store", body = crate::models::Store),
        (status = 404, description = "Store not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Stores",
    security(("bearer_auth" = []))
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.directory_service.get_store(id).await?))
}

/// Update a store
#[utoipa::path(
    put,
    path = "/store/{id}",
    params(("id" = i64, Path, description = "Store id")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Updated store", body = crate::models::Store),
        (status = 400, description = "Empty name or unknown location", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Store not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Stores",
    security(("bearer_auth" = []))
)]
pub async fn update_store(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = state
        .directory_service
        .update_store(id, StoreChanges::try_from(req)?)
        .await?;
    Ok(Json(store))
}

/// Delete a store
#[utoipa::path(
    delete,
    path = "/store/{id}",
    params(("id" = i64, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store deleted", body = MessageResponse),
        (status = 404, description = "Store not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Stores",
    security(("bearer_auth" = []))
)]
pub async fn delete_store(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.directory_service.delete_store(id).await?;
    Ok(Json(MessageResponse::new("Store deleted")))
}
