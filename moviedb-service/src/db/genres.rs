use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Genre;

/// Create a new genre record
pub async fn create_genre(pool: &PgPool, name: &str) -> Result<Genre, sqlx::Error> {
    let genre = sqlx::query_as::<_, Genre>(
        r#"
        INSERT INTO genres (id, name)
        VALUES ($1, $2)
        RETURNING id, name
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created genre: id={}, name={}", genre.id, genre.name);
    Ok(genre)
}

/// Get a genre by ID
pub async fn find_genre_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Genre>, sqlx::Error> {
    sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get a genre by its exact name
pub async fn find_genre_by_name(pool: &PgPool, name: &str) -> Result<Option<Genre>, sqlx::Error> {
    sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// List every genre, alphabetically
pub async fn list_genres(pool: &PgPool) -> Result<Vec<Genre>, sqlx::Error> {
    sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(pool)
        .await
}

/// Rename a genre; `None` when it does not exist
pub async fn update_genre_name(
    pool: &PgPool,
    id: Uuid,
    name: &str,
) -> Result<Option<Genre>, sqlx::Error> {
    sqlx::query_as::<_, Genre>(
        r#"
        UPDATE genres
        SET name = $1
        WHERE id = $2
        RETURNING id, name
        "#,
    )
    .bind(name)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a genre; returns the removed record
pub async fn delete_genre(pool: &PgPool, id: Uuid) -> Result<Option<Genre>, sqlx::Error> {
    let deleted = sqlx::query_as::<_, Genre>("DELETE FROM genres WHERE id = $1 RETURNING id, name")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if let Some(genre) = &deleted {
        tracing::info!("Deleted genre: id={}, name={}", genre.id, genre.name);
    }
    Ok(deleted)
}
