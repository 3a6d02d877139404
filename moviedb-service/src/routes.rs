use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::StorageBackend;
use crate::handlers::{genres, health, movies, upload, users};
use crate::middleware::{authenticate, authorize_admin, create_cors_layer, logging_middleware};
use crate::storage::local::UPLOADS_ROUTE;
use crate::AppState;

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "API route not found" })),
    )
}

/// Routes that require a valid token
fn authenticated(state: &Arc<AppState>, router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    router.route_layer(from_fn_with_state(state.clone(), authenticate))
}

/// Routes that require a valid token belonging to an admin
fn admin_only(state: &Arc<AppState>, router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    authenticated(state, router.route_layer(from_fn(authorize_admin)))
}

fn user_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(users::register))
        .route("/auth", post(users::login))
        .route("/logout", post(users::logout))
        .merge(authenticated(
            state,
            Router::new().route(
                "/profile",
                get(users::get_profile).put(users::update_profile),
            ),
        ))
        .merge(admin_only(state, Router::new().route("/", get(users::list_users))))
}

fn genre_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(genres::list_genres))
        .route("/:id", get(genres::get_genre))
        .merge(admin_only(
            state,
            Router::new()
                .route("/", post(genres::create_genre))
                .route("/:id", put(genres::update_genre).delete(genres::delete_genre)),
        ))
}

fn movie_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/all-movies", get(movies::list_movies))
        .route("/specific-movie/:id", get(movies::get_movie))
        .route("/new-movies", get(movies::new_movies))
        .route("/top-movies", get(movies::top_movies))
        .route("/random-movies", get(movies::random_movies))
        .merge(authenticated(
            state,
            Router::new().route("/:id/reviews", post(movies::add_review)),
        ))
        .merge(admin_only(
            state,
            Router::new()
                .route("/create-movie", post(movies::create_movie))
                .route("/update-movie/:id", put(movies::update_movie))
                .route("/delete-movie/:id", delete(movies::delete_movie))
                .route("/delete-comment", delete(movies::delete_comment)),
        ))
}

fn upload_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    admin_only(state, Router::new().route("/", post(upload::upload_image)))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1/users", user_routes(&state))
        .nest("/api/v1/genre", genre_routes(&state))
        .nest("/api/v1/movies", movie_routes(&state))
        .nest("/api/v1/upload", upload_routes(&state));

    if config.storage.backend == StorageBackend::Local {
        router = router.nest_service(UPLOADS_ROUTE, ServeDir::new(&config.storage.local.directory));
    }

    router
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&config.cors))
        .with_state(state)
}
