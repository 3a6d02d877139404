pub mod genre;
pub mod movie;
pub mod user;

use serde::{Deserialize, Serialize};

pub use genre::{Genre, GenreRequest};
pub use movie::{
    CreateMovieRequest, DeleteReviewRequest, Movie, Review, ReviewError,
    ReviewRequest, UpdateMovieRequest,
};
pub use user::{LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserPublic};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
