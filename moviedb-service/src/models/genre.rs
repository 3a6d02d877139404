use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenreRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "Genre name is required (max 32 characters)"))]
    pub name: String,
}

impl GenreRequest {
    /// Trims surrounding whitespace before validation and storage.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}
