use clap::{Parser, Subcommand};
use seeder::seed::{Seeder, run_seeder};
use seeder::seeds::{admin::AdminSeeder, subjects::SubjectSeeder};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seeder", about = "Loads reference data and bootstraps the admin account")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Insert the reference subjects that are missing.
    Subjects,
    /// Create the administrator account unless one exists.
    Admin,
    /// Run every seeder.
    All,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,seeder=info")),
        )
        .with_target(false)
        .init();

    let db = match db::connect().await {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Failed to connect to {}: {err}", util::config::database_path());
            std::process::exit(1);
        }
    };

    let seeders: Vec<(Box<dyn Seeder>, &str)> = match cli.command.unwrap_or(Command::All) {
        Command::Subjects => vec![(Box::new(SubjectSeeder), "Subjects")],
        Command::Admin => vec![(Box::new(AdminSeeder), "Admin")],
        Command::All => vec![
            (Box::new(SubjectSeeder), "Subjects"),
            (Box::new(AdminSeeder), "Admin"),
        ],
    };

    for (seeder, name) in seeders {
        if run_seeder(&*seeder, name, &db).await.is_err() {
            std::process::exit(1);
        }
    }
}
