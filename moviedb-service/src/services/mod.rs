pub mod directory;
pub mod reviews;
pub mod user_service;

pub use directory::{PgUserDirectory, UserDirectory};
pub use user_service::{Session, UserService};
