//! Review mutations. Each runs in one transaction holding the movie row lock,
//! so the stored rating and count always match the stored reviews.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{movies, users};
use crate::error::{ApiError, ApiResult};
use crate::models::{Review, ReviewError, ReviewRequest};

/// A concurrent review by the same user loses on the one-per-user constraint
fn review_insert_error(err: sqlx::Error) -> ApiError {
    if shared::database::is_unique_violation(&err) {
        ApiError::from(ReviewError::AlreadyReviewed)
    } else {
        ApiError::from(err)
    }
}

pub async fn add_review(
    pool: &PgPool,
    movie_id: Uuid,
    user_id: Uuid,
    req: ReviewRequest,
) -> ApiResult<Review> {
    req.validate()?;

    let mut tx = pool.begin().await?;

    let user = users::find_user_by_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, user not found".to_string()))?;

    let mut movie = movies::lock_movie(&mut *tx, movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    let review = Review::new(user.id, user.username, req.rating, req.comment);
    movie.add_review(review.clone())?;

    movies::insert_review(&mut *tx, movie.id, &review)
        .await
        .map_err(review_insert_error)?;
    movies::store_review_summary(&mut *tx, &movie).await?;

    tx.commit().await?;

    tracing::info!(
        "User {} reviewed movie {} with rating {}",
        user_id,
        movie_id,
        review.rating
    );
    Ok(review)
}

pub async fn delete_review(pool: &PgPool, movie_id: Uuid, review_id: Uuid) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    let mut movie = movies::lock_movie(&mut *tx, movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    movie.remove_review(review_id)?;

    movies::delete_review(&mut *tx, movie.id, review_id).await?;
    movies::store_review_summary(&mut *tx, &movie).await?;

    tx.commit().await?;

    tracing::info!("Deleted review {} from movie {}", review_id, movie_id);
    Ok(())
}
