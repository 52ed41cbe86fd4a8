pub mod auth;
pub mod directory;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use directory::MessageResponse;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid credentials")]
    pub message: String,
}
