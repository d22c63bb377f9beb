pub mod config;
pub mod db;
pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;

/// Store file used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_FILE: &str = "raiz_diseno.db";
