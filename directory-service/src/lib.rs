pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use service_core::axum::{
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::config::DirectoryConfig;
use crate::services::{
    AuthService, CredentialStore, DirectoryService, JwtService, LocationRepository,
    RefreshTokenRegistry, StoreRepository, UserRepository,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        root,
        handlers::metrics::metrics,
        handlers::auth::registration::register,
        handlers::auth::session::login,
        handlers::auth::session::refresh,
        handlers::auth::session::logout,
        handlers::user::profile,
        handlers::user::list_users,
        handlers::location::create_location,
        handlers::location::list_locations,
        handlers::location::get_location,
        handlers::location::update_location,
        handlers::location::delete_location,
        handlers::store::create_store,
        handlers::store::list_stores,
        handlers::store::get_store,
        handlers::store::update_store,
        handlers::store::delete_store,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MessageResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::RegisterResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::auth::RefreshRequest,
            dtos::auth::RefreshResponse,
            dtos::auth::LogoutRequest,
            dtos::auth::ProfileResponse,
            dtos::auth::UsersResponse,
            dtos::directory::CreateLocationRequest,
            dtos::directory::UpdateLocationRequest,
            dtos::directory::CreateStoreRequest,
            dtos::directory::UpdateStoreRequest,
            models::Role,
            models::UserProfile,
            models::UserSummary,
            models::Location,
            models::Store,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and session tokens"),
        (name = "User", description = "User profiles"),
        (name = "Locations", description = "Location management"),
        (name = "Stores", description = "Store management"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: DirectoryConfig,
    pub jwt: JwtService,
    pub credentials: CredentialStore,
    pub auth_service: AuthService,
    pub directory_service: DirectoryService,
}

impl AppState {
    /// Wire the services over whichever backends were chosen at startup.
    pub fn new(
        config: DirectoryConfig,
        jwt: JwtService,
        users: Arc<dyn UserRepository>,
        locations: Arc<dyn LocationRepository>,
        stores: Arc<dyn StoreRepository>,
        registry: Arc<dyn RefreshTokenRegistry>,
    ) -> Self {
        let credentials = CredentialStore::new(users);
        let auth_service = AuthService::new(credentials.clone(), jwt.clone(), registry);
        let directory_service = DirectoryService::new(locations, stores);

        Self {
            config,
            jwt,
            credentials,
            auth_service,
            directory_service,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Everything here sits behind the bearer token check
    let protected_routes = Router::new()
        .route("/auth/profile", get(handlers::profile))
        .route("/users", get(handlers::list_users))
        .route(
            "/location",
            post(handlers::create_location).get(handlers::list_locations),
        )
        .route(
            "/location/:id",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .route(
            "/store",
            post(handlers::create_store).get(handlers::list_stores),
        )
        .route(
            "/store/:id",
            get(handlers::get_store)
                .put(handlers::update_store)
                .delete(handlers::delete_store),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let cors = cors_layer(&state.config.security.allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .merge(protected_routes)
        .with_state(state)
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Liveness banner
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is running", body = dtos::MessageResponse)),
    tag = "Observability"
)]
pub async fn root() -> Json<dtos::MessageResponse> {
    Json(dtos::MessageResponse::new("Server is running"))
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Service is unhealthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store = match state.credentials.health_check().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!(error = %e, "Credential store health check failed");
            "down"
        }
    };

    let registry = match state.auth_service.health_check().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!(error = %e, "Refresh token registry health check failed");
            "down"
        }
    };

    let healthy = store == "up" && registry == "up";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "service": state.config.service_name,
            "version": state.config.service_version,
            "environment": format!("{:?}", state.config.environment),
            "checks": {
                "credential_store": store,
                "refresh_registry": registry
            }
        })),
    )
}
