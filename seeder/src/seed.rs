use async_trait::async_trait;
use colored::*;
use sea_orm::{DatabaseConnection, DbErr};
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 60;

#[async_trait]
pub trait Seeder: Send + Sync {
    /// Runs the seed and returns a one-line summary of what changed.
    async fn seed(&self, db: &DatabaseConnection) -> Result<String, DbErr>;
}

/// Runs one seeder, printing an aligned progress line. Errors are printed
/// and handed back so the caller can decide the exit code.
pub async fn run_seeder<S: Seeder + ?Sized>(
    seeder: &S,
    name: &str,
    db: &DatabaseConnection,
) -> Result<String, DbErr> {
    let base_msg = format!("Seeding {}", name.bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(base_msg.len()));
    print!("{}{} ", base_msg, dots);
    io::stdout().flush().ok();

    let start = Instant::now();
    match seeder.seed(db).await {
        Ok(summary) => {
            let time_str = format!("({:.2?})", start.elapsed()).dimmed();
            println!("{} {} {}", "done".green(), time_str, summary);
            Ok(summary)
        }
        Err(err) => {
            println!("{}", "failed".red());
            eprintln!("  {}", err.to_string().red());
            Err(err)
        }
    }
}
