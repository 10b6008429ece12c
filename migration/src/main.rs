use colored::*;
use migration::ledger;
use migration::runner::{self, UnitEvent};
use std::io::{self, Write};
use std::path::Path;
use util::{config, paths};

const STATUS_COLUMN: usize = 80;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let db_path = config::database_path();
    let args: Vec<String> = std::env::args().collect();

    let ok = match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
            true
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            run_pending(&db_path).await
        }
        Some("status") => print_status(&db_path).await,
        Some("up") | None => run_pending(&db_path).await,
        Some(other) => {
            eprintln!("Unknown command `{other}`. Expected one of: up, status, fresh, clean");
            false
        }
    };

    if !ok {
        std::process::exit(1);
    }
}

async fn connect(db_path: &str) -> Option<sea_orm::DatabaseConnection> {
    if let Err(e) = paths::ensure_parent_dir(db_path) {
        eprintln!("{} could not create DB directory: {e}", "error:".red());
        return None;
    }
    let url = format!("sqlite://{db_path}?mode=rwc");
    match sea_orm::Database::connect(&url).await {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("{} DB connection failed: {e}", "error:".red());
            None
        }
    }
}

async fn run_pending(db_path: &str) -> bool {
    let units = match ledger::ordered() {
        Ok(units) => units,
        Err(e) => {
            eprintln!("{} {e}", "invalid ledger:".red());
            return false;
        }
    };
    let Some(db) = connect(db_path).await else {
        return false;
    };

    println!("Running migrations...");
    let result = runner::apply_units(&db, &units, |event| match event {
        UnitEvent::Started(name) => {
            let label = format!("Applying {}", name.bold());
            let dots = ".".repeat(STATUS_COLUMN.saturating_sub(label.len()));
            print!("{label}{dots} ");
            let _ = io::stdout().flush();
        }
        UnitEvent::Applied(_, elapsed) => {
            let time_str = format!("({elapsed:.2?})").dimmed();
            println!("{} {}", "done".green(), time_str);
        }
        UnitEvent::Failed(_, err) => {
            println!("{}", "failed".red());
            eprintln!("  {err}");
        }
        UnitEvent::Skipped(_) => {}
    })
    .await;

    match result {
        Ok(applied) if applied.is_empty() => {
            println!("Nothing to apply, ledger is up to date.");
            true
        }
        Ok(applied) => {
            println!("Applied {} migration(s).", applied.len());
            true
        }
        Err(_) => false,
    }
}

async fn print_status(db_path: &str) -> bool {
    let Some(db) = connect(db_path).await else {
        return false;
    };
    match runner::status(&db).await {
        Ok(rows) => {
            for row in rows {
                let dots = ".".repeat(STATUS_COLUMN.saturating_sub(row.name.len()));
                let state = if row.applied {
                    "applied".green()
                } else {
                    "pending".yellow()
                };
                println!("{}{} {}", row.name, dots, state);
            }
            true
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red());
            false
        }
    }
}

fn remove_db_file(path: &str) {
    let db_path = Path::new(path);
    if db_path.exists() {
        match std::fs::remove_file(db_path) {
            Ok(()) => println!("Deleted DB: {}", db_path.display()),
            Err(e) => eprintln!("Failed to delete {}: {e}", db_path.display()),
        }
    } else {
        println!("DB file does not exist: {}", db_path.display());
    }

    let storage = paths::storage_root();
    if storage.exists() {
        match std::fs::remove_dir_all(&storage) {
            Ok(()) => println!("Deleted uploaded files: {}", storage.display()),
            Err(e) => eprintln!("Failed to delete {}: {e}", storage.display()),
        }
    }
}
