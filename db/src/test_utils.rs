use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory database with the whole ledger applied.
///
/// Pinned to one connection: every SQLite `:memory:` connection is its own
/// database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory db");

    migration::runner::apply_pending(&db)
        .await
        .expect("Failed to run migrations");

    db
}
