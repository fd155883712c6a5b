pub mod documents;
pub mod models;
pub mod rbac;
pub mod repositories;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;

/// Opens the relational store.
///
/// `path_or_url` is either a full `sqlite:` DSN or a file path; for a file path
/// the parent directory is created first since SQLite won't create it.
pub async fn connect(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    if !path_or_url.starts_with("sqlite:") {
        if let Some(parent) = Path::new(path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut options = ConnectOptions::new(util::config::sqlite_url(path_or_url));
    options.sqlx_logging(false);
    Database::connect(options).await
}
