use std::{env, fs, path::Path, process};

mod runner;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let Ok(db_path) = env::var("DATABASE_PATH") else {
        eprintln!("DATABASE_PATH must be set");
        process::exit(1);
    };
    let args: Vec<String> = env::args().collect();

    let command = args.get(1).map(String::as_str).unwrap_or("up");
    if command == "fresh" {
        remove_db_file(&db_path);
    }
    if let Err(err) = create_db_dir(&db_path) {
        eprintln!("Failed to create DB directory: {err}");
        process::exit(1);
    }

    let db = match sea_orm::Database::connect(util::config::sqlite_url(&db_path)).await {
        Ok(db) => db,
        Err(err) => {
            eprintln!("DB connection failed: {err}");
            process::exit(1);
        }
    };

    let result = match command {
        "up" | "fresh" => runner::run_pending(&db).await,
        "down" => {
            let steps = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
            runner::roll_back(&db, steps).await
        }
        "status" => runner::print_status(&db).await,
        other => {
            eprintln!("Unknown command '{other}'. Expected one of: up, fresh, down [n], status");
            process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn remove_db_file(path: &str) {
    let db_path = Path::new(path);
    if db_path.exists() {
        match fs::remove_file(db_path) {
            Ok(()) => println!("Deleted DB: {}", db_path.display()),
            Err(err) => eprintln!("Failed to delete DB file {}: {err}", db_path.display()),
        }
    } else {
        println!("DB file does not exist: {}", db_path.display());
    }

    // Attachments belong to documents that no longer have references.
    if let Ok(upload_root) = env::var("UPLOAD_STORAGE_ROOT") {
        let upload_path = Path::new(&upload_root);
        if upload_path.exists() {
            match fs::remove_dir_all(upload_path) {
                Ok(()) => println!("Deleted uploads: {}", upload_path.display()),
                Err(err) => eprintln!("Failed to delete uploads: {err}"),
            }
        }
    }
}

fn create_db_dir(path: &str) -> std::io::Result<()> {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
