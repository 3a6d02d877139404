use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{CreateMovieRequest, Movie, Review, UpdateMovieRequest};

const MOVIE_COLUMNS: &str = "id, title, description, year, genre_id, image, cast_members, \
                             rating, num_reviews, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ReviewRow {
    movie_id: Uuid,
    id: Uuid,
    name: String,
    rating: f64,
    comment: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_parts(self) -> (Uuid, Review) {
        (
            self.movie_id,
            Review {
                id: self.id,
                name: self.name,
                rating: self.rating,
                comment: self.comment,
                user: self.user_id,
                created_at: self.created_at,
            },
        )
    }
}

/// Load reviews for the given movies, oldest first, grouped by movie
async fn fetch_reviews<'e, E>(
    executor: E,
    movie_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Review>>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT movie_id, id, name, rating, comment, user_id, created_at
        FROM movie_reviews
        WHERE movie_id = ANY($1)
        ORDER BY created_at, id
        "#,
    )
    .bind(movie_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<Review>> = HashMap::new();
    for row in rows {
        let (movie_id, review) = row.into_parts();
        grouped.entry(movie_id).or_default().push(review);
    }
    Ok(grouped)
}

async fn with_reviews(pool: &PgPool, mut movies: Vec<Movie>) -> Result<Vec<Movie>, sqlx::Error> {
    if movies.is_empty() {
        return Ok(movies);
    }

    let ids: Vec<Uuid> = movies.iter().map(|m| m.id).collect();
    let mut reviews = fetch_reviews(pool, &ids).await?;
    for movie in &mut movies {
        movie.reviews = reviews.remove(&movie.id).unwrap_or_default();
    }
    Ok(movies)
}

/// Create a new movie; review bookkeeping starts empty
pub async fn create_movie(pool: &PgPool, request: &CreateMovieRequest) -> Result<Movie, sqlx::Error> {
    let movie = sqlx::query_as::<_, Movie>(&format!(
        r#"
        INSERT INTO movies (id, title, description, year, genre_id, image, cast_members,
                            rating, num_reviews, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, NOW(), NOW())
        RETURNING {MOVIE_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&request.title)
    .bind(&request.description)
    .bind(request.year)
    .bind(request.genre)
    .bind(&request.image)
    .bind(&request.cast)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created movie: id={}, title={}", movie.id, movie.title);
    Ok(movie)
}

/// Get a movie and its reviews by ID
pub async fn find_movie_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Movie>, sqlx::Error> {
    let movie = sqlx::query_as::<_, Movie>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match movie {
        Some(movie) => Ok(with_reviews(pool, vec![movie]).await?.pop()),
        None => Ok(None),
    }
}

/// All movies in insertion order
pub async fn list_movies(pool: &PgPool) -> Result<Vec<Movie>, sqlx::Error> {
    let movies = sqlx::query_as::<_, Movie>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;

    with_reviews(pool, movies).await
}

/// Most recently created movies first
pub async fn newest_movies(pool: &PgPool, limit: i64) -> Result<Vec<Movie>, sqlx::Error> {
    let movies = sqlx::query_as::<_, Movie>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    with_reviews(pool, movies).await
}

/// Movies with the most reviews first
pub async fn top_movies(pool: &PgPool, limit: i64) -> Result<Vec<Movie>, sqlx::Error> {
    let movies = sqlx::query_as::<_, Movie>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY num_reviews DESC, rating DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    with_reviews(pool, movies).await
}

/// A random sample of movies
pub async fn random_movies(pool: &PgPool, limit: i64) -> Result<Vec<Movie>, sqlx::Error> {
    let movies = sqlx::query_as::<_, Movie>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY random() LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    with_reviews(pool, movies).await
}

/// Apply a partial update; `None` when the movie does not exist
pub async fn update_movie(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateMovieRequest,
) -> Result<Option<Movie>, sqlx::Error> {
    let movie = sqlx::query_as::<_, Movie>(&format!(
        r#"
        UPDATE movies
        SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            year = COALESCE($4, year),
            genre_id = COALESCE($5, genre_id),
            image = COALESCE($6, image),
            cast_members = COALESCE($7, cast_members),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {MOVIE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(request.year)
    .bind(request.genre)
    .bind(&request.image)
    .bind(&request.cast)
    .fetch_optional(pool)
    .await?;

    match movie {
        Some(movie) => {
            tracing::info!("Updated movie: id={}", movie.id);
            Ok(with_reviews(pool, vec![movie]).await?.pop())
        }
        None => Ok(None),
    }
}

/// Delete a movie and, by cascade, its reviews
pub async fn delete_movie(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM movies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!("Deleted movie: id={}", id);
    }
    Ok(deleted)
}

/// Lock a movie row for the rest of the transaction and load its reviews
pub async fn lock_movie(conn: &mut PgConnection, id: Uuid) -> Result<Option<Movie>, sqlx::Error> {
    let movie = sqlx::query_as::<_, Movie>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut movie) = movie else {
        return Ok(None);
    };

    movie.reviews = fetch_reviews(&mut *conn, &[movie.id])
        .await?
        .remove(&movie.id)
        .unwrap_or_default();
    Ok(Some(movie))
}

pub async fn insert_review(
    conn: &mut PgConnection,
    movie_id: Uuid,
    review: &Review,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO movie_reviews (id, movie_id, user_id, name, rating, comment, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(review.id)
    .bind(movie_id)
    .bind(review.user)
    .bind(&review.name)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn delete_review(
    conn: &mut PgConnection,
    movie_id: Uuid,
    review_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM movie_reviews WHERE id = $1 AND movie_id = $2")
        .bind(review_id)
        .bind(movie_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Persist the aggregated rating and review count of a movie
pub async fn store_review_summary(conn: &mut PgConnection, movie: &Movie) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE movies
        SET rating = $1, num_reviews = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(movie.rating)
    .bind(movie.num_reviews)
    .bind(movie.id)
    .execute(conn)
    .await?;

    tracing::debug!(
        "Review summary for movie {}: rating={}, num_reviews={}",
        movie.id,
        movie.rating,
        movie.num_reviews
    );
    Ok(())
}
