pub mod genres;
pub mod health;
pub mod movies;
pub mod upload;
pub mod users;

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Parse a path identifier; malformed ids are reported as not found
pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("Invalid Object of: {}", raw)))
}
