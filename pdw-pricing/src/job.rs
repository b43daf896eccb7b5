//! One pass over the pricing drop directory
//!
//! Each file loads in its own transaction together with its SUCCESS state
//! row. A failing file is rolled back, recorded as FAILED and reported in
//! the summary; the remaining files still run.

use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::discovery::{discover_files, sha256_hex, PricingFile};
use crate::error::Result;
use crate::parse::parse_pricing_csv;
use crate::state::{already_ingested, write_attempt, FileAttempt, FileStatus};
use crate::upsert::upsert_pricing_rows;

/// Directory and file name pattern to scan
#[derive(Debug, Clone)]
pub struct PricingSource {
    pub dir: PathBuf,
    pub prefix: String,
    pub suffix: String,
}

impl PricingSource {
    /// State key for files from this source
    pub fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub file_id: String,
    pub error: String,
}

/// Outcome of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source_location: String,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    /// Parsed rows of processed files, inserts and updates alike
    pub rows_loaded: usize,
    pub failures: Vec<FileFailure>,
}

enum FileOutcome {
    Skipped,
    Loaded { rows: usize },
}

/// Load every new or changed pricing file once
///
/// # Errors
/// Only when the directory cannot be listed; per-file failures land in
/// [`RunSummary::failures`].
pub async fn run_once(pool: &SqlitePool, source: &PricingSource) -> Result<RunSummary> {
    let location = source.location();
    let files = discover_files(&source.dir, &source.prefix, &source.suffix).await?;
    info!("Found {} pricing file(s) in {}", files.len(), location);

    let mut summary = RunSummary {
        source_location: location.clone(),
        files_found: files.len(),
        ..RunSummary::default()
    };

    for file in &files {
        match load_file(pool, &location, file).await {
            Ok(FileOutcome::Skipped) => {
                info!("Skipping {} (already loaded, unchanged)", file.file_name);
                summary.files_skipped += 1;
            }
            Ok(FileOutcome::Loaded { rows }) => {
                info!("Loaded {} ({} rows)", file.file_name, rows);
                summary.files_processed += 1;
                summary.rows_loaded += rows;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", file.file_name, e);
                let message = e.to_string();
                record_failure(pool, &location, file, &message).await;
                summary.failures.push(FileFailure {
                    file_name: file.file_name.clone(),
                    file_id: file.file_id.clone(),
                    error: message,
                });
            }
        }
    }

    Ok(summary)
}

async fn load_file(pool: &SqlitePool, location: &str, file: &PricingFile) -> Result<FileOutcome> {
    let data = tokio::fs::read(&file.path).await?;
    let file_hash = sha256_hex(&data);

    if already_ingested(pool, location, &file.file_id, Some(&file_hash)).await? {
        return Ok(FileOutcome::Skipped);
    }

    let rows = parse_pricing_csv(&data)?;

    // Dropping the transaction on any error below rolls it back
    let mut tx = pool.begin().await?;
    upsert_pricing_rows(&mut tx, &rows).await?;
    write_attempt(
        &mut tx,
        &FileAttempt {
            source_location: location,
            file_id: &file.file_id,
            file_name: &file.file_name,
            file_hash: Some(&file_hash),
            status: FileStatus::Success,
            rows_loaded: rows.len() as i64,
            error_message: None,
        },
    )
    .await?;
    tx.commit().await?;

    Ok(FileOutcome::Loaded { rows: rows.len() })
}

async fn record_failure(pool: &SqlitePool, location: &str, file: &PricingFile, message: &str) {
    let result = async {
        let mut conn = pool.acquire().await?;
        write_attempt(
            &mut conn,
            &FileAttempt {
                source_location: location,
                file_id: &file.file_id,
                file_name: &file.file_name,
                file_hash: None,
                status: FileStatus::Failed,
                rows_loaded: 0,
                error_message: Some(message.to_string()),
            },
        )
        .await
    }
    .await;

    if let Err(e) = result {
        error!("Failed to record FAILED state for {}: {}", file.file_name, e);
    }
}
