pub mod bmi;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod stats;

use axum::{routing::get, Router};

use crate::db::Database;

/// The full application router: every domain sub-router plus a health
/// probe, sharing one database handle.
pub fn app(db: Database) -> Router {
    Router::new()
        .merge(routes::users::routes(db.clone()))
        .merge(routes::bmi::routes(db.clone()))
        .merge(routes::progress::routes(db))
        .route("/health", get(|| async { "✅ Backend up" }))
}
