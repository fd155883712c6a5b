use std::process::ExitCode;

use colored::*;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use util::config::AppConfig;

use crate::seed::{Seeder, run_seeder};
use crate::seeds::{rbac::RbacSeeder, user::UserSeeder};

mod seed;
mod seeds;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "Invalid configuration:".red());
            return ExitCode::FAILURE;
        }
    };

    let db = match db::connect(&config.database_path).await {
        Ok(db) => db,
        Err(err) => {
            eprintln!("{} {err}", "Failed to open database:".red());
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = Migrator::up(&db, None).await {
        eprintln!("{} {err}", "Migrations failed:".red());
        return ExitCode::FAILURE;
    }

    for (seeder, name) in [
        (Box::new(RbacSeeder) as Box<dyn Seeder + Send + Sync>, "Roles and permissions"),
        (Box::new(UserSeeder), "Users"),
    ] {
        if run_seeder(&*seeder, name, &db).await.is_err() {
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
