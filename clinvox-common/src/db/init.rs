//! Database initialization
//!
//! Opens or creates the clinic database at a fixed file name and ensures the
//! patient, recording, and assignment collections (and their secondary
//! indexes) exist. Creation is idempotent; opening an existing database adds
//! missing tables but performs no data migration between versions.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Current schema version recorded in the schema_version table
pub const SCHEMA_VERSION: i64 = 1;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create the database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    // Set busy timeout so a locked database waits instead of failing outright
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent, safe to call multiple times)
///
/// Recordings reference patients by convention only; there is deliberately no
/// foreign-key constraint on recordings.patient_id. The delete cascade is
/// handled by the store in a transaction.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_patients_table(pool).await?;
    create_recordings_table(pool).await?;
    create_assignments_table(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the patients table
///
/// Name-range and age-range rules live in the patient workflow, not here;
/// the store only requires non-blank names on insert.
pub async fn create_patients_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            gender TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            medical_history TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_patients_last_name ON patients(last_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_patients_dob ON patients(date_of_birth)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the recordings table
///
/// Recordings are immutable after insert; there is no update path.
pub async fn create_recordings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recordings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL,
            recorded_at TIMESTAMP NOT NULL,
            audio_data BLOB NOT NULL,
            duration_ms INTEGER NOT NULL,
            mime_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            CHECK (duration_ms >= 0),
            CHECK (size_bytes >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recordings_patient ON recordings(patient_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recordings_recorded_at ON recordings(recorded_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the assignments table
///
/// The primary key is the application-generated share code.
pub async fn create_assignments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            id TEXT PRIMARY KEY,
            patient_id INTEGER NOT NULL,
            test_types TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assignments_patient ON assignments(patient_id)")
        .execute(pool)
        .await?;

    Ok(())
}
