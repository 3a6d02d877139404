use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Movie already reviewed")]
    AlreadyReviewed,

    #[error("Comment not found")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Reviewer's username when the review was written
    pub name: String,
    pub rating: f64,
    pub comment: String,
    #[sqlx(rename = "user_id")]
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user: Uuid, name: impl Into<String>, rating: f64, comment: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rating,
            comment: comment.into(),
            user,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub year: Option<i32>,
    #[sqlx(rename = "genre_id")]
    pub genre: Option<Uuid>,
    pub image: Option<String>,
    #[sqlx(rename = "cast_members")]
    pub cast: Vec<String>,
    pub rating: f64,
    pub num_reviews: i32,
    #[sqlx(skip)]
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Append a review, one per user, and refresh `rating`/`num_reviews`.
    pub fn add_review(&mut self, review: Review) -> Result<(), ReviewError> {
        if self.reviews.iter().any(|r| r.user == review.user) {
            return Err(ReviewError::AlreadyReviewed);
        }

        self.reviews.push(review);
        self.refresh_review_summary();
        Ok(())
    }

    /// Remove a review by id and refresh `rating`/`num_reviews`.
    pub fn remove_review(&mut self, review_id: Uuid) -> Result<Review, ReviewError> {
        let index = self
            .reviews
            .iter()
            .position(|r| r.id == review_id)
            .ok_or(ReviewError::NotFound)?;

        let removed = self.reviews.remove(index);
        self.refresh_review_summary();
        Ok(removed)
    }

    fn refresh_review_summary(&mut self) {
        self.num_reviews = self.reviews.len() as i32;
        self.rating = average_rating(&self.reviews);
    }
}

/// Arithmetic mean of the review ratings, 0 when there are none.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(range(min = 1888, max = 2100))]
    pub year: Option<i32>,

    pub genre: Option<Uuid>,

    pub image: Option<String>,

    #[serde(default)]
    pub cast: Vec<String>,
}

/// Partial update; review bookkeeping fields are not accepted here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 1888, max = 2100))]
    pub year: Option<i32>,

    pub genre: Option<Uuid>,

    pub image: Option<String>,

    pub cast: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRequest {
    #[serde(deserialize_with = "number_or_numeric_string")]
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: f64,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

/// Form posts send the rating as text, so `"4"` is accepted alongside `4`
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rating {
        Number(f64),
        Text(String),
    }

    match Rating::deserialize(deserializer)? {
        Rating::Number(value) => Ok(value),
        Rating::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("rating must be a number, got {:?}", text))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReviewRequest {
    pub movie_id: Uuid,
    pub review_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn movie() -> Movie {
        let now = Utc::now();
        Movie {
            id: Uuid::new_v4(),
            title: "Heat".to_string(),
            description: "A group of professional bank robbers".to_string(),
            year: Some(1995),
            genre: None,
            image: None,
            cast: vec!["Al Pacino".to_string(), "Robert De Niro".to_string()],
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_summary_consistent(movie: &Movie) {
        assert_eq!(movie.num_reviews as usize, movie.reviews.len());
        assert_eq!(movie.rating, average_rating(&movie.reviews));
    }

    #[test]
    fn test_add_review_recomputes_average() {
        let mut movie = movie();

        movie.add_review(Review::new(Uuid::new_v4(), "alice", 4.0, "Great")).unwrap();
        assert_eq!(movie.num_reviews, 1);
        assert_eq!(movie.rating, 4.0);

        movie.add_review(Review::new(Uuid::new_v4(), "bob", 5.0, "Classic")).unwrap();
        movie.add_review(Review::new(Uuid::new_v4(), "carol", 3.0, "Long")).unwrap();
        assert_eq!(movie.num_reviews, 3);
        assert_eq!(movie.rating, 4.0);
        assert_eq!(movie.reviews[2].name, "carol");
    }

    #[test]
    fn test_second_review_by_same_user_rejected() {
        let mut movie = movie();
        let user = Uuid::new_v4();

        movie.add_review(Review::new(user, "alice", 2.0, "Meh")).unwrap();
        let err = movie
            .add_review(Review::new(user, "alice", 5.0, "Changed my mind"))
            .unwrap_err();

        assert_eq!(err, ReviewError::AlreadyReviewed);
        assert_eq!(movie.num_reviews, 1);
        assert_eq!(movie.rating, 2.0);
    }

    #[test]
    fn test_remove_review_recomputes_average() {
        let mut movie = movie();
        let first = Review::new(Uuid::new_v4(), "alice", 1.0, "No");
        let first_id = first.id;
        movie.add_review(first).unwrap();
        movie.add_review(Review::new(Uuid::new_v4(), "bob", 5.0, "Yes")).unwrap();
        assert_eq!(movie.rating, 3.0);

        let removed = movie.remove_review(first_id).unwrap();
        assert_eq!(removed.name, "alice");
        assert_eq!(movie.num_reviews, 1);
        assert_eq!(movie.rating, 5.0);
    }

    #[test]
    fn test_removing_last_review_resets_rating() {
        let mut movie = movie();
        let review = Review::new(Uuid::new_v4(), "alice", 4.5, "Good");
        let review_id = review.id;
        movie.add_review(review).unwrap();

        movie.remove_review(review_id).unwrap();
        assert_eq!(movie.num_reviews, 0);
        assert_eq!(movie.rating, 0.0);
        assert!(!movie.rating.is_nan());
    }

    #[test]
    fn test_remove_unknown_review() {
        let mut movie = movie();
        movie.add_review(Review::new(Uuid::new_v4(), "alice", 4.0, "Good")).unwrap();

        assert_eq!(movie.remove_review(Uuid::new_v4()), Err(ReviewError::NotFound));
        assert_eq!(movie.num_reviews, 1);
    }

    #[test]
    fn test_summary_stays_consistent_across_mixed_operations() {
        let mut movie = movie();
        let mut ids = Vec::new();

        for (i, rating) in [5.0, 1.0, 3.5, 2.0, 4.0].into_iter().enumerate() {
            let review = Review::new(Uuid::new_v4(), format!("user{}", i), rating, "");
            ids.push(review.id);
            movie.add_review(review).unwrap();
            assert_summary_consistent(&movie);
        }

        for id in [ids[1], ids[4], ids[0]] {
            movie.remove_review(id).unwrap();
            assert_summary_consistent(&movie);
        }
        assert_eq!(movie.rating, 2.75);

        for id in [ids[2], ids[3]] {
            movie.remove_review(id).unwrap();
        }
        assert_summary_consistent(&movie);
        assert_eq!(movie.rating, 0.0);
    }

    #[test]
    fn test_movie_json_uses_document_keys() {
        let movie = movie();
        let json = serde_json::to_value(&movie).unwrap();

        assert_eq!(json["_id"], movie.id.to_string());
        assert_eq!(json["numReviews"], 0);
        assert!(json.get("createdAt").is_some());
        assert!(json["reviews"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_review_request_validation() {
        let ok = ReviewRequest { rating: 5.0, comment: "Loved it".to_string() };
        assert!(ok.validate().is_ok());

        let too_high = ReviewRequest { rating: 9.0, comment: String::new() };
        assert!(too_high.validate().is_err());
    }

    #[test]
    fn test_review_rating_accepts_numeric_text() {
        let req: ReviewRequest = serde_json::from_str(r#"{"rating":"4","comment":"Tense"}"#).unwrap();
        assert_eq!(req.rating, 4.0);

        let req: ReviewRequest = serde_json::from_str(r#"{"rating":3.5}"#).unwrap();
        assert_eq!(req.rating, 3.5);
        assert_eq!(req.comment, "");
    }

    #[test]
    fn test_review_rating_rejects_text_and_absence() {
        let err = serde_json::from_str::<ReviewRequest>(r#"{"rating":"great"}"#).unwrap_err();
        assert!(err.to_string().contains("rating must be a number"));

        assert!(serde_json::from_str::<ReviewRequest>(r#"{"comment":"no score"}"#).is_err());
        assert!(serde_json::from_str::<ReviewRequest>(r#"{"rating":null}"#).is_err());
    }
}
