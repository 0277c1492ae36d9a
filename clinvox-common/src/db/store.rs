//! The record store
//!
//! Wraps the SQLite pool and exposes create/read/update/delete plus simple
//! scans over the patient, recording, and assignment collections. Every
//! operation is async, maps engine failures into [`crate::Error::Database`],
//! and is never retried here; callers surface failures to the user.
//!
//! Search is a linear scan over the loaded patient collection. That is
//! acceptable at single-clinic record counts; the schema carries secondary
//! indexes for the day this needs to become a real indexed query.

use crate::db::models::{
    DatabaseStats, NewPatient, NewRecording, Patient, PatientSearch, Recording, SortOrder,
    TestAssignment,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// Default result cap for patient search
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Handle to the clinic database
///
/// Cheap to clone; clones share the underlying pool. Constructed once at
/// startup and handed to each workflow.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Access to the underlying pool (tests, stats queries)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---- patients ----

    /// Insert a new patient and return its store-assigned id
    ///
    /// Rejects blank first or last name; stamps `created_at`.
    pub async fn add_patient(&self, new: NewPatient) -> Result<i64> {
        if new.first_name.trim().is_empty() || new.last_name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "first and last name are required".to_string(),
            ));
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO patients
                (first_name, last_name, date_of_birth, gender, email, phone, medical_history, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.date_of_birth)
        .bind(&new.gender)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.medical_history)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Added patient {} ({} {})", id, new.first_name, new.last_name);
        Ok(id)
    }

    /// Look up a patient by id; a missing id is a normal outcome, not an error
    pub async fn get_patient(&self, id: i64) -> Result<Option<Patient>> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| patient_from_row(&r)).transpose()
    }

    /// Overwrite an existing patient record
    ///
    /// Full-row overwrite; callers merge fields before calling. Stamps
    /// `updated_at`. Fails with NotFound if the id does not exist.
    pub async fn update_patient(&self, patient: &Patient) -> Result<()> {
        let updated_at = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE patients
            SET first_name = ?, last_name = ?, date_of_birth = ?, gender = ?,
                email = ?, phone = ?, medical_history = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.date_of_birth)
        .bind(&patient.gender)
        .bind(&patient.email)
        .bind(&patient.phone)
        .bind(&patient.medical_history)
        .bind(updated_at)
        .bind(patient.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("patient {}", patient.id)));
        }
        Ok(())
    }

    /// Delete a patient and everything owned by it as one unit of work
    ///
    /// Recordings referencing the id go first, then the patient's
    /// assignments, then the patient row, all in a single transaction.
    pub async fn delete_patient(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let recordings = sqlx::query("DELETE FROM recordings WHERE patient_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM assignments WHERE patient_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let patients = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if patients == 0 {
            tx.rollback().await?;
            return Err(Error::NotFound(format!("patient {}", id)));
        }

        tx.commit().await?;
        info!("Deleted patient {} and {} recordings", id, recordings);
        Ok(())
    }

    /// All patients, newest-created first
    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        let rows = sqlx::query("SELECT * FROM patients ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(patient_from_row).collect()
    }

    /// Filter patients by the given criteria
    ///
    /// Loads the full collection and filters in memory: case-insensitive
    /// substring match on names, exact date-of-birth equality. Results come
    /// back newest-created first, truncated to the limit.
    pub async fn search_patients(&self, criteria: &PatientSearch) -> Result<Vec<Patient>> {
        let limit = criteria.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let first = criteria.first_name.as_deref().map(str::to_lowercase);
        let last = criteria.last_name.as_deref().map(str::to_lowercase);

        let patients = self.list_patients().await?;
        let matches = patients
            .into_iter()
            .filter(|p| {
                first
                    .as_deref()
                    .map_or(true, |f| p.first_name.to_lowercase().contains(f))
                    && last
                        .as_deref()
                        .map_or(true, |l| p.last_name.to_lowercase().contains(l))
                    && criteria
                        .date_of_birth
                        .as_deref()
                        .map_or(true, |dob| p.date_of_birth == dob)
            })
            .take(limit)
            .collect();

        Ok(matches)
    }

    // ---- recordings ----

    /// Insert a new recording and return its store-assigned id
    ///
    /// Rejects a missing patient reference or empty payload. Stamps the
    /// capture time when absent and derives the byte size from the payload.
    /// Whether the patient exists is the caller's concern; the reference is
    /// by convention only.
    pub async fn add_recording(&self, new: NewRecording) -> Result<i64> {
        if new.patient_id <= 0 {
            return Err(Error::InvalidInput(
                "recording requires a patient reference".to_string(),
            ));
        }
        if new.audio_data.is_empty() {
            return Err(Error::InvalidInput(
                "recording requires an audio payload".to_string(),
            ));
        }

        let recorded_at = new.recorded_at.unwrap_or_else(Utc::now);
        let size_bytes = new.audio_data.len() as i64;

        let result = sqlx::query(
            r#"
            INSERT INTO recordings
                (patient_id, recorded_at, audio_data, duration_ms, mime_type, size_bytes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.patient_id)
        .bind(recorded_at)
        .bind(&new.audio_data)
        .bind(new.duration_ms)
        .bind(&new.mime_type)
        .bind(size_bytes)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(
            "Added recording {} for patient {} ({} bytes)",
            id, new.patient_id, size_bytes
        );
        Ok(id)
    }

    /// Look up a recording by id
    pub async fn get_recording(&self, id: i64) -> Result<Option<Recording>> {
        let row = sqlx::query("SELECT * FROM recordings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| recording_from_row(&r)).transpose()
    }

    /// All recordings for a patient, sorted by capture time
    pub async fn get_patient_recordings(
        &self,
        patient_id: i64,
        order: SortOrder,
    ) -> Result<Vec<Recording>> {
        let sql = match order {
            SortOrder::Ascending => {
                "SELECT * FROM recordings WHERE patient_id = ? ORDER BY recorded_at ASC, id ASC"
            }
            SortOrder::Descending => {
                "SELECT * FROM recordings WHERE patient_id = ? ORDER BY recorded_at DESC, id DESC"
            }
        };

        let rows = sqlx::query(sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(recording_from_row).collect()
    }

    /// All recordings across all patients, capture time ascending
    pub async fn list_recordings(&self) -> Result<Vec<Recording>> {
        let rows = sqlx::query("SELECT * FROM recordings ORDER BY recorded_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(recording_from_row).collect()
    }

    // ---- assignments ----

    /// Persist a test assignment under the given share code
    pub async fn add_assignment(
        &self,
        patient_id: i64,
        test_types: &[String],
        share_code: &str,
    ) -> Result<TestAssignment> {
        if test_types.is_empty() {
            return Err(Error::InvalidInput(
                "assignment requires at least one test type".to_string(),
            ));
        }

        let created_at = Utc::now();
        let test_types_json = serde_json::to_string(test_types)?;

        sqlx::query(
            "INSERT INTO assignments (id, patient_id, test_types, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(share_code)
        .bind(patient_id)
        .bind(&test_types_json)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(TestAssignment {
            id: share_code.to_string(),
            patient_id,
            test_types: test_types.to_vec(),
            created_at,
        })
    }

    /// Look up an assignment by its share code
    pub async fn get_assignment(&self, share_code: &str) -> Result<Option<TestAssignment>> {
        let row = sqlx::query("SELECT * FROM assignments WHERE id = ?")
            .bind(share_code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| assignment_from_row(&r)).transpose()
    }

    /// All assignments for a patient, newest first
    pub async fn get_patient_assignments(&self, patient_id: i64) -> Result<Vec<TestAssignment>> {
        let rows =
            sqlx::query("SELECT * FROM assignments WHERE patient_id = ? ORDER BY created_at DESC")
                .bind(patient_id)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(assignment_from_row).collect()
    }

    // ---- maintenance ----

    /// Empty all collections; irreversible
    pub async fn clear_database(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM recordings")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM assignments")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM patients")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Cleared all collections");
        Ok(())
    }

    /// Aggregate counts and total payload bytes across the database
    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        let total_patients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await?;
        let total_recordings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recordings")
            .fetch_one(&self.pool)
            .await?;
        let total_assignments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assignments")
            .fetch_one(&self.pool)
            .await?;
        let total_storage_bytes: Option<i64> =
            sqlx::query_scalar("SELECT SUM(size_bytes) FROM recordings")
                .fetch_one(&self.pool)
                .await?;
        let oldest_patient_created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MIN(created_at) FROM patients")
                .fetch_one(&self.pool)
                .await?;
        let newest_patient_created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM patients")
                .fetch_one(&self.pool)
                .await?;

        Ok(DatabaseStats {
            total_patients,
            total_recordings,
            total_assignments,
            total_storage_bytes: total_storage_bytes.unwrap_or(0),
            oldest_patient_created_at,
            newest_patient_created_at,
        })
    }
}

fn patient_from_row(row: &SqliteRow) -> Result<Patient> {
    Ok(Patient {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: row.try_get("gender")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        medical_history: row.try_get("medical_history")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn recording_from_row(row: &SqliteRow) -> Result<Recording> {
    Ok(Recording {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        recorded_at: row.try_get("recorded_at")?,
        audio_data: row.try_get("audio_data")?,
        duration_ms: row.try_get("duration_ms")?,
        mime_type: row.try_get("mime_type")?,
        size_bytes: row.try_get("size_bytes")?,
    })
}

fn assignment_from_row(row: &SqliteRow) -> Result<TestAssignment> {
    let test_types_json: String = row.try_get("test_types")?;
    Ok(TestAssignment {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        test_types: serde_json::from_str(&test_types_json)?,
        created_at: row.try_get("created_at")?,
    })
}
