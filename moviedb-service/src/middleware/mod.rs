pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::{authenticate, authorize_admin};
pub use cors::create_cors_layer;
pub use logging::logging_middleware;
