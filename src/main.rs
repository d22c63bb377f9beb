use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;

use raiz_crm::DEFAULT_DATABASE_FILE;
use raiz_crm::config::AppConfig;
use raiz_crm::db::{establish_connection_pool, run_migrations};
use raiz_crm::repository::DieselRepository;
use raiz_crm::services::backup::{backup_database, merge_external_store, restore_if_missing};
use raiz_crm::services::import::import_file;

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config_path = env::var("CONFIG_PATH").unwrap_or("config.json".to_string());
    let config_path = PathBuf::from(config_path);
    let database_url = env::var("DATABASE_URL").unwrap_or(DEFAULT_DATABASE_FILE.to_string());
    let db_path = PathBuf::from(&database_url);

    let mut config = AppConfig::load(&config_path);
    if config.backup_folder.is_none() {
        if let Some(folder) = prompt("Backup folder (enter to skip): ") {
            config.backup_folder = Some(PathBuf::from(folder));
            if let Err(err) = config.save(&config_path) {
                log::warn!("could not save configuration: {err}");
            }
        }
    }

    // A fresh machine with only the backup file gets its data back
    // before the store is opened.
    match restore_if_missing(&config, &db_path) {
        Ok(Some(source)) => log::info!("restored store from {}", source.display()),
        Ok(None) => {}
        Err(err) => log::warn!("automatic restore failed: {err}"),
    }

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = run_migrations(&mut conn) {
                log::error!("Failed to run migrations: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Failed to get a database connection: {e}");
            std::process::exit(1);
        }
    }

    let repo = DieselRepository::new(pool);

    loop {
        println!();
        println!("1) Import spreadsheet (CSV)");
        println!("2) Back up database");
        println!("3) Merge an external store file");
        println!("4) Quit");

        let Some(choice) = prompt("> ") else {
            break;
        };

        match choice.as_str() {
            "1" => {
                let Some(path) = prompt("Sheet path: ") else {
                    continue;
                };
                match import_file(&repo, Path::new(&path)) {
                    Ok(summary) => println!(
                        "Imported: {} customers, {} orders, {} items ({} rows skipped)",
                        summary.customers_created,
                        summary.orders_created,
                        summary.items_created,
                        summary.rows_skipped
                    ),
                    Err(err) => println!("Import failed: {err}"),
                }
            }
            "2" => match backup_database(&config, &db_path) {
                Ok(destination) => println!("Backup written to {}", destination.display()),
                Err(err) => println!("Backup failed: {err}"),
            },
            "3" => {
                let Some(path) = prompt("Store file path: ") else {
                    continue;
                };
                match merge_external_store(&repo, Path::new(&path)) {
                    Ok(summary) => println!(
                        "Merged: {} customers, {} orders, {} items added",
                        summary.customers_added, summary.orders_added, summary.items_added
                    ),
                    Err(err) => println!("Merge failed: {err}"),
                }
            }
            "4" | "q" => break,
            other => println!("Unknown option: {other}"),
        }
    }
}

/// Reads one trimmed line from stdin; `None` on EOF or empty input.
fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    std::io::stdout().flush().ok()?;

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).ok()? == 0 {
        return None;
    }

    let trimmed = line.trim().to_string();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
