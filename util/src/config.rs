//! Application configuration loaded from the environment.
//!
//! `AppConfig` is read once at startup (after `.env` is loaded through `dotenvy`)
//! and then handed to whatever needs it. Nothing in the workspace reaches for a
//! global copy, so tests can build a config directly with [`AppConfig::from_vars`].

use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Which backend holds achievement documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentBackend {
    Mongo,
    Memory,
}

impl FromStr for DocumentBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Represents the complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub document_store: DocumentBackend,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub jwt_duration_minutes: i64,
    pub refresh_token_duration_days: i64,
    pub upload_storage_root: String,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let document_store = parse(&lookup, "DOCUMENT_STORE", DocumentBackend::Mongo)?;

        Ok(Self {
            env: or("APP_ENV", "development"),
            project_name: or("PROJECT_NAME", "achievement-api"),
            log_level: or("LOG_LEVEL", "api=info,services=info,db=info"),
            log_file: or("LOG_FILE", "api.log"),
            log_to_stdout: or("LOG_TO_STDOUT", "false").eq_ignore_ascii_case("true"),
            database_path: required("DATABASE_PATH")?,
            document_store,
            mongo_uri: or("MONGO_URI", "mongodb://127.0.0.1:27017"),
            mongo_database: or("MONGO_DATABASE", "achievements"),
            host: or("HOST", "127.0.0.1"),
            port: parse(&lookup, "PORT", 3000)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            jwt_duration_minutes: parse(&lookup, "JWT_DURATION_MINUTES", 120)?,
            refresh_token_duration_days: parse(&lookup, "REFRESH_TOKEN_DURATION_DAYS", 7)?,
            upload_storage_root: or("UPLOAD_STORAGE_ROOT", "uploads"),
        })
    }

}

/// Turns `DATABASE_PATH` into a sea-orm connection string.
///
/// Full DSNs (`sqlite:...`) pass through untouched; plain paths are opened in
/// read-write-create mode.
pub fn sqlite_url(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", path)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
