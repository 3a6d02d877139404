use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::db::genres;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::parse_id;
use crate::models::{Genre, GenreRequest, MessageResponse};
use crate::AppState;

const GENRE_EXISTS: &str = "Genre already exists";

fn genre_not_found() -> ApiError {
    ApiError::NotFound("Genre not found".to_string())
}

fn unique_as_conflict(err: sqlx::Error) -> ApiError {
    if shared::database::is_unique_violation(&err) {
        ApiError::AlreadyExists(GENRE_EXISTS.to_string())
    } else {
        err.into()
    }
}

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GenreRequest>,
) -> ApiResult<(StatusCode, Json<Genre>)> {
    let req = req.normalized();
    req.validate()?;

    if genres::find_genre_by_name(&state.db_pool, &req.name).await?.is_some() {
        return Err(ApiError::AlreadyExists(GENRE_EXISTS.to_string()));
    }

    let genre = genres::create_genre(&state.db_pool, &req.name)
        .await
        .map_err(unique_as_conflict)?;
    Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<GenreRequest>,
) -> ApiResult<Json<Genre>> {
    let id = parse_id(&id)?;
    let req = req.normalized();
    req.validate()?;

    let genre = genres::update_genre_name(&state.db_pool, id, &req.name)
        .await
        .map_err(unique_as_conflict)?
        .ok_or_else(genre_not_found)?;
    Ok(Json(genre))
}

pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;

    genres::delete_genre(&state.db_pool, id)
        .await?
        .ok_or_else(genre_not_found)?;
    Ok(Json(MessageResponse::new("Genre deleted successfully")))
}

pub async fn list_genres(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(genres::list_genres(&state.db_pool).await?))
}

pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Genre>> {
    let id = parse_id(&id)?;

    let genre = genres::find_genre_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(genre_not_found)?;
    Ok(Json(genre))
}
