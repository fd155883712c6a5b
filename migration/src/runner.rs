use colored::*;
use sea_orm::DatabaseConnection;
use sea_orm_migration::{MigrationStatus, prelude::*};
use std::io::{self, Write};
use std::time::Instant;

use migration::Migrator;

const STATUS_COLUMN: usize = 80;

pub async fn run_pending(db: &DatabaseConnection) -> Result<(), DbErr> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if pending.is_empty() {
        println!("{}", "Nothing to migrate".dimmed());
        return Ok(());
    }

    println!("Running migrations...");
    for migration in pending {
        print_label("Applying", migration.name());
        let start = Instant::now();
        report(Migrator::up(db, Some(1)).await, start)?;
    }
    Ok(())
}

pub async fn roll_back(db: &DatabaseConnection, steps: u32) -> Result<(), DbErr> {
    let mut applied: Vec<_> = Migrator::get_applied_migrations(db).await?;
    applied.reverse();

    for migration in applied.into_iter().take(steps as usize) {
        print_label("Reverting", migration.name());
        let start = Instant::now();
        report(Migrator::down(db, Some(1)).await, start)?;
    }
    Ok(())
}

pub async fn print_status(db: &DatabaseConnection) -> Result<(), DbErr> {
    for migration in Migrator::get_migration_with_status(db).await? {
        let label = match migration.status() {
            MigrationStatus::Applied => "applied".green(),
            MigrationStatus::Pending => "pending".yellow(),
        };
        let dots = ".".repeat(STATUS_COLUMN.saturating_sub(migration.name().len()));
        println!("{}{} {}", migration.name().bold(), dots, label);
    }
    Ok(())
}

fn print_label(action: &str, name: &str) {
    let name_str = format!("{} {}", action, name.bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(name_str.len()));
    print!("{}{} ", name_str, dots);
    let _ = io::stdout().flush();
}

fn report(result: Result<(), DbErr>, start: Instant) -> Result<(), DbErr> {
    match result {
        Ok(()) => {
            let time_str = format!("({:.2?})", start.elapsed()).dimmed();
            println!("{} {}", "done".green(), time_str);
            Ok(())
        }
        Err(err) => {
            println!("{}", "failed".red());
            Err(err)
        }
    }
}
