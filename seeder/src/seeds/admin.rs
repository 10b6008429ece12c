use crate::seed::Seeder;
use async_trait::async_trait;
use db::models::user::{self, Role};
use sea_orm::{DatabaseConnection, DbErr};
use util::config;

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminCredentials {
    /// `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`, with development
    /// defaults.
    pub fn from_config() -> Self {
        Self {
            username: config::admin_username(),
            email: config::admin_email(),
            password: config::admin_password(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    AlreadyExists { username: String, email: String },
    Created { username: String, email: String },
}

/// Makes sure an administrator account exists. Any existing admin wins and
/// nothing is written. Not safe to run concurrently with itself.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    credentials: &AdminCredentials,
) -> Result<BootstrapOutcome, DbErr> {
    if let Some(admin) = user::Model::find_admin(db).await? {
        tracing::info!(username = %admin.username, "Admin account already present");
        return Ok(BootstrapOutcome::AlreadyExists {
            username: admin.username,
            email: admin.email,
        });
    }

    let admin = user::Model::create(
        db,
        &credentials.username,
        &credentials.email,
        &credentials.password,
        Role::Admin,
    )
    .await?;
    tracing::info!(username = %admin.username, "Created admin account");

    Ok(BootstrapOutcome::Created {
        username: admin.username,
        email: admin.email,
    })
}

pub struct AdminSeeder;

#[async_trait]
impl Seeder for AdminSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<String, DbErr> {
        Ok(match ensure_admin(db, &AdminCredentials::from_config()).await? {
            BootstrapOutcome::AlreadyExists { username, email } => {
                format!("admin exists: {username} <{email}>")
            }
            BootstrapOutcome::Created { username, email } => {
                format!("created admin {username} <{email}>")
            }
        })
    }
}
