//! Shared utilities for MovieDB backend services
//!
//! - `database`: Postgres pool construction, health checks and error classification
//! - `observability`: structured logging setup

pub mod database;
pub mod observability;
