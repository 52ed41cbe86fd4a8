use directory_service::{
    build_router,
    config::DirectoryConfig,
    services::{
        spawn_registry_sweeper, Database, InMemoryRegistry, JwtService, LocationRepository,
        MemoryDatabase, RedisRegistry, RefreshTokenRegistry, StoreRepository, UserRepository,
    },
    AppState,
};
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

struct Repositories {
    users: Arc<dyn UserRepository>,
    locations: Arc<dyn LocationRepository>,
    stores: Arc<dyn StoreRepository>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = DirectoryConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    directory_service::services::metrics::init_metrics()?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting directory service"
    );

    let repositories = match &config.database {
        Some(db_config) => {
            let db = Database::connect(db_config).await?;
            db.ensure_schema().await?;
            let db = Arc::new(db);
            Repositories {
                users: db.clone(),
                locations: db.clone(),
                stores: db,
            }
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            let db = Arc::new(MemoryDatabase::new());
            Repositories {
                users: db.clone(),
                locations: db.clone(),
                stores: db,
            }
        }
    };

    let registry: Arc<dyn RefreshTokenRegistry> = match &config.redis {
        Some(redis_config) => Arc::new(RedisRegistry::new(redis_config).await?),
        None => {
            tracing::info!("REDIS_URL not set, refresh tokens are held in process memory");
            Arc::new(InMemoryRegistry::new())
        }
    };

    let sweeper = spawn_registry_sweeper(
        registry.clone(),
        Duration::from_secs(config.registry.sweep_interval_seconds),
    );

    let jwt = JwtService::new(&config.jwt)?;

    let state = AppState::new(
        config.clone(),
        jwt,
        repositories.users,
        repositories.locations,
        repositories.stores,
        registry,
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    service_core::axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
