use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AppConfig;
use crate::domain::import::MergeSummary;
use crate::repository::MergeWriter;
use crate::services::{ServiceError, ServiceResult};

/// Fixed name of the single-generation backup file inside the
/// configured folder. Each backup overwrites the previous one.
pub const BACKUP_FILE_NAME: &str = "backup_raiz_diseno.db";

/// Result type returned by the backup file operations.
pub type BackupResult<T> = Result<T, BackupError>;

/// Errors raised by the backup file operations.
#[derive(Debug, Error)]
pub enum BackupError {
    /// No backup folder is configured.
    #[error("no backup folder is configured")]
    NoBackupFolder,
    /// The live store file does not exist yet.
    #[error("database file not found at {0}")]
    MissingDatabase(PathBuf),
    /// Filesystem failure while copying.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Copies the live store into the configured folder under
/// [`BACKUP_FILE_NAME`], overwriting any previous copy. The folder is
/// created if needed. Returns the backup path.
pub fn backup_database(config: &AppConfig, db_path: &Path) -> BackupResult<PathBuf> {
    let folder = config.backup_folder().ok_or(BackupError::NoBackupFolder)?;

    if !db_path.exists() {
        return Err(BackupError::MissingDatabase(db_path.to_path_buf()));
    }

    std::fs::create_dir_all(folder)?;

    let destination = folder.join(BACKUP_FILE_NAME);
    std::fs::copy(db_path, &destination)?;

    log::info!("backup written to {}", destination.display());

    Ok(destination)
}

/// Restores the store from the configured backup when the store file is
/// absent. Every unmet precondition (no folder configured, store already
/// present, no backup file) is a silent no-op; only an actual copy
/// failure is an error. Returns the backup path when a restore happened.
pub fn restore_if_missing(config: &AppConfig, db_path: &Path) -> BackupResult<Option<PathBuf>> {
    let Some(folder) = config.backup_folder() else {
        return Ok(None);
    };

    if db_path.exists() {
        return Ok(None);
    }

    let backup_path = folder.join(BACKUP_FILE_NAME);
    if !backup_path.exists() {
        return Ok(None);
    }

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::copy(&backup_path, db_path)?;

    log::info!("store restored from {}", backup_path.display());

    Ok(Some(backup_path))
}

/// Merges the records of an arbitrary external store file into the live
/// store, de-duplicating customers by RUT then name, orders by code and
/// items by (product, quantity, unit price) tuple.
pub fn merge_external_store<R>(repo: &R, source: &Path) -> ServiceResult<MergeSummary>
where
    R: MergeWriter + ?Sized,
{
    if !source.exists() {
        return Err(ServiceError::Form(format!(
            "store file not found: {}",
            source.display()
        )));
    }

    let summary = repo.merge_store(source)?;

    log::info!(
        "merge finished: {} customers, {} orders, {} items added from {}",
        summary.customers_added,
        summary.orders_added,
        summary.items_added,
        source.display()
    );

    Ok(summary)
}
