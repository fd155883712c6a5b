use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use api::routes::app;
use api::state::AppState;
use db::documents::{AchievementDocumentStore, MemoryDocumentStore, MongoDocumentStore};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use services::token::{TokenIssuer, TokenSettings};
use tracing::{error, info, warn};
use tracing_appender::rolling;
use util::config::{AppConfig, DocumentBackend};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(&config.database_path).await?;
    Migrator::up(&db, None).await?;
    db::rbac::ensure_defaults(&db).await?;

    let documents: Arc<dyn AchievementDocumentStore> = match config.document_store {
        DocumentBackend::Mongo => {
            Arc::new(MongoDocumentStore::connect(&config.mongo_uri, &config.mongo_database).await?)
        }
        DocumentBackend::Memory => {
            warn!("Using the in-memory document store; achievement documents will not survive a restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    tokio::fs::create_dir_all(&config.upload_storage_root).await?;

    let tokens = TokenIssuer::new(&TokenSettings::from_config(&config));
    let state = AppState::new(db, documents, tokens, &config.upload_storage_root);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        project = %config.project_name,
        env = %config.env,
        documents = ?config.document_store,
        "Starting on http://{addr}"
    );

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &AppConfig) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("api=info"));

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    if config.log_to_stdout {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
