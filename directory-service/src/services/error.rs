use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Missing refresh token")]
    MissingRefreshToken,

    #[error("Email already in use")]
    EmailAlreadyRegistered,

    #[error("User not found")]
    UserNotFound,

    #[error("Location not found")]
    LocationNotFound,

    #[error("Store not found")]
    StoreNotFound,

    #[error("Location {0} does not exist")]
    UnknownLocation(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::from(e),
            ServiceError::Redis(e) => AppError::RedisError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::InvalidRefreshToken => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid refresh token"))
            }
            ServiceError::MissingRefreshToken => {
                AppError::BadRequest(anyhow::anyhow!("Missing refresh token"))
            }
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already in use"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::LocationNotFound => {
                AppError::NotFound(anyhow::anyhow!("Location not found"))
            }
            ServiceError::StoreNotFound => AppError::NotFound(anyhow::anyhow!("Store not found")),
            ServiceError::UnknownLocation(id) => {
                AppError::BadRequest(anyhow::anyhow!("Location {} does not exist", id))
            }
            ServiceError::ValidationError(e) => AppError::BadRequest(anyhow::anyhow!(e)),
        }
    }
}
