//! Postgres repository functions, one module per table family

pub mod genres;
pub mod movies;
pub mod users;
