//! File ingestion state in `etl_file_ingestion_state`
//!
//! One row per attempt; the newest row for a file decides whether it is
//! loaded again.

use sqlx::{SqliteConnection, SqlitePool};

/// State rows written by this job carry this source system
pub const STATE_SOURCE_SYSTEM: &str = "FILE_DROP";

/// Longest error message stored with a FAILED attempt
pub const MAX_ERROR_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Success,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Success => "SUCCESS",
            FileStatus::Failed => "FAILED",
        }
    }
}

/// One attempt to record
#[derive(Debug, Clone)]
pub struct FileAttempt<'a> {
    pub source_location: &'a str,
    pub file_id: &'a str,
    pub file_name: &'a str,
    pub file_hash: Option<&'a str>,
    pub status: FileStatus,
    pub rows_loaded: i64,
    pub error_message: Option<String>,
}

/// True when the latest attempt succeeded and the content has not changed
///
/// An unknown hash on either side counts as unchanged.
pub async fn already_ingested(
    pool: &SqlitePool,
    source_location: &str,
    file_id: &str,
    file_hash: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let latest: Option<(String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT status, file_hash
        FROM etl_file_ingestion_state
        WHERE source_system = ? AND source_location = ? AND file_id = ?
        ORDER BY ingestion_key DESC
        LIMIT 1
        "#,
    )
    .bind(STATE_SOURCE_SYSTEM)
    .bind(source_location)
    .bind(file_id)
    .fetch_optional(pool)
    .await?;

    let Some((status, previous_hash)) = latest else {
        return Ok(false);
    };

    if status != FileStatus::Success.as_str() {
        return Ok(false);
    }

    match (file_hash, previous_hash.as_deref()) {
        (Some(current), Some(previous)) => Ok(current == previous),
        _ => Ok(true),
    }
}

pub async fn write_attempt(conn: &mut SqliteConnection, attempt: &FileAttempt<'_>) -> Result<(), sqlx::Error> {
    let error_message = attempt
        .error_message
        .as_deref()
        .map(|msg| truncate_chars(msg, MAX_ERROR_LEN));

    sqlx::query(
        r#"
        INSERT INTO etl_file_ingestion_state
            (source_system, source_location, file_id, file_name, file_hash,
             status, rows_loaded, error_message)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(STATE_SOURCE_SYSTEM)
    .bind(attempt.source_location)
    .bind(attempt.file_id)
    .bind(attempt.file_name)
    .bind(attempt.file_hash)
    .bind(attempt.status.as_str())
    .bind(attempt.rows_loaded)
    .bind(error_message)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
