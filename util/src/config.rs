//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. The `APP_ENV`
//! variable selects the settings profile: `.env` is loaded first and
//! `.env.<APP_ENV>` is layered on top of it when present.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Secret used when `JWT_SECRET` is not provided. Rejected in production.
pub const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    InsecureJwtSecret,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub storage_root: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
    pub google_client_id: String,
    pub google_tokeninfo_url: String,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Unparseable config value, using default");
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env`, the `APP_ENV` profile file and
    /// the process environment. Missing values fall back to development defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let app_env = var_or("APP_ENV", "development");
        dotenvy::from_filename(format!(".env.{app_env}")).ok();

        Self {
            env: app_env,
            project_name: var_or("PROJECT_NAME", "lms-backend"),
            log_level: var_or("LOG_LEVEL", "api=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "true") == "true",
            database_path: var_or("DATABASE_PATH", "data/lms.db"),
            storage_root: var_or("STORAGE_ROOT", "data/media"),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 3000),
            jwt_secret: var_or("JWT_SECRET", DEV_JWT_SECRET),
            jwt_duration_minutes: parsed_or("JWT_DURATION_MINUTES", 60 * 24),
            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_email: var_or("ADMIN_EMAIL", "admin@example.com"),
            admin_password: var_or("ADMIN_PASSWORD", "admin123"),
            google_client_id: var_or("GOOGLE_CLIENT_ID", ""),
            google_tokeninfo_url: var_or(
                "GOOGLE_TOKENINFO_URL",
                "https://oauth2.googleapis.com/tokeninfo",
            ),
        }
    }

    /// Checks settings that must not keep their development defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.env.eq_ignore_ascii_case("production") && self.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::InsecureJwtSecret);
        }
        if self.jwt_duration_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "JWT_DURATION_MINUTES",
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            if let Ok(mut guard) = lock.write() {
                *guard = AppConfig::from_env();
            }
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.storage_root = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value);
    }

    pub fn set_admin_credentials(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) {
        AppConfig::set_field(|cfg| {
            cfg.admin_username = username.into();
            cfg.admin_email = email.into();
            cfg.admin_password = password.into();
        });
    }

    pub fn set_google_client_id(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.google_client_id = value.into());
    }

    pub fn set_google_tokeninfo_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.google_tokeninfo_url = value.into());
    }
}

// --- Free accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn storage_root() -> String {
    AppConfig::global().storage_root.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn admin_username() -> String {
    AppConfig::global().admin_username.clone()
}

pub fn admin_email() -> String {
    AppConfig::global().admin_email.clone()
}

pub fn admin_password() -> String {
    AppConfig::global().admin_password.clone()
}

pub fn google_client_id() -> String {
    AppConfig::global().google_client_id.clone()
}

pub fn google_tokeninfo_url() -> String {
    AppConfig::global().google_tokeninfo_url.clone()
}
