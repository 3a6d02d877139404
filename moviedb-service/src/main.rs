mod auth;
mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod storage;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use shared::database::{close_connections, create_connection_pool};
use shared::observability::{init_logging, init_production_logging, LogConfig};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthService;
use crate::config::{Config, Environment};
use crate::services::{PgUserDirectory, UserDirectory, UserService};
use crate::storage::{build_image_store, ImageStore};

pub struct AppState {
    pub config: Config,
    pub db_pool: PgPool,
    pub auth: Arc<AuthService>,
    pub users: UserService,
    pub directory: Arc<dyn UserDirectory>,
    pub images: Arc<dyn ImageStore>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    match config.server.environment {
        Environment::Production => init_production_logging("moviedb-service"),
        Environment::Development => init_logging(LogConfig::from_env("moviedb-service")),
    }
    .context("Failed to initialize logging")?;

    info!("Starting MovieDB service v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = create_connection_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let auth = Arc::new(AuthService::new(config.jwt.clone()));
    let users = UserService::new(db_pool.clone(), auth.clone());

    if let Some(admin) = &config.admin {
        users
            .seed_admin(admin)
            .await
            .context("Failed to seed admin account")?;
    }

    let images = build_image_store(&config.storage)
        .await
        .context("Failed to initialize image storage")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState {
        config,
        db_pool: db_pool.clone(),
        auth,
        users,
        directory: Arc::new(PgUserDirectory::new(db_pool.clone())),
        images,
    });

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("MovieDB service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_connections(&db_pool).await;
    info!("MovieDB service shut down gracefully");
    Ok(())
}
