pub mod analytics;
pub mod career;
pub mod error;
pub mod learning_path;
pub mod models;
pub mod test_utils;

pub use error::ModelError;

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;
use util::config;

/// Opens the configured database. A bare path is treated as a SQLite file
/// (created on demand); anything that already looks like a DSN is used as-is.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    let url = if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        path_or_url
    } else {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(&path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    tracing::debug!(url = %url, "Connecting to database");
    Database::connect(&url).await
}
