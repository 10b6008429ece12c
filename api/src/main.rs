use api::auth::middleware::log_request;
use api::routes::app_router;
use axum::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::{
    config::{self, AppConfig},
    state::AppState,
};

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file());

    if let Err(e) = AppConfig::global().validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to the database");
            eprintln!("Failed to connect to the database: {e}");
            std::process::exit(1);
        }
    };
    let app_state = AppState::new(db);

    // Configure middleware
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    // Build app router
    let app = app_router(app_state).layer(from_fn(log_request)).layer(cors);

    // Start server
    let addr: SocketAddr = match format!("{}:{}", config::host(), config::port()).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid listen address {}:{}: {e}", config::host(), config::port());
            std::process::exit(1);
        }
    };

    println!(
        "Starting {} on http://{}:{}",
        config::project_name(),
        config::host(),
        config::port()
    );
    tracing::info!(%addr, env = %config::env(), "Server starting");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        tracing::error!(error = %e, "Server crashed");
        std::process::exit(1);
    }
}

fn init_logging(log_file: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(true)
    });

    let env_filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new(config::log_level()))
        .unwrap_or_else(|_| EnvFilter::new("api=info,db=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}
