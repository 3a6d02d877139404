use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::auth::Claims;
use crate::db::movies;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::parse_id;
use crate::models::{
    CreateMovieRequest, DeleteReviewRequest, MessageResponse, Movie, ReviewRequest,
    UpdateMovieRequest,
};
use crate::services::reviews;
use crate::AppState;

/// Size of the newest/top/random listings
const HIGHLIGHT_LIMIT: i64 = 10;

fn movie_not_found() -> ApiError {
    ApiError::NotFound("Movie not found".to_string())
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateMovieRequest>,
) -> ApiResult<Json<Movie>> {
    req.validate()?;
    Ok(Json(movies::create_movie(&state.db_pool, &req).await?))
}

pub async fn list_movies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(movies::list_movies(&state.db_pool).await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Movie>> {
    let id = parse_id(&id)?;

    let movie = movies::find_movie_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(movie_not_found)?;
    Ok(Json(movie))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateMovieRequest>,
) -> ApiResult<Json<Movie>> {
    let id = parse_id(&id)?;
    req.validate()?;

    let movie = movies::update_movie(&state.db_pool, id, &req)
        .await?
        .ok_or_else(movie_not_found)?;
    Ok(Json(movie))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;

    if !movies::delete_movie(&state.db_pool, id).await? {
        return Err(movie_not_found());
    }
    Ok(Json(MessageResponse::new("Movie deleted successfully")))
}

pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let movie_id = parse_id(&id)?;
    reviews::add_review(&state.db_pool, movie_id, claims.user_id()?, req).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Review added"))))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<DeleteReviewRequest>,
) -> ApiResult<Json<MessageResponse>> {
    reviews::delete_review(&state.db_pool, req.movie_id, req.review_id).await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

pub async fn new_movies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(movies::newest_movies(&state.db_pool, HIGHLIGHT_LIMIT).await?))
}

pub async fn top_movies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(movies::top_movies(&state.db_pool, HIGHLIGHT_LIMIT).await?))
}

pub async fn random_movies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(movies::random_movies(&state.db_pool, HIGHLIGHT_LIMIT).await?))
}
