//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A patient record as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 calendar date (YYYY-MM-DD)
    pub date_of_birth: String,
    pub gender: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields for creating a patient; the store assigns id and created_at
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub medical_history: Option<String>,
}

/// A voice-sample recording as stored (payload included)
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: i64,
    pub patient_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub audio_data: Vec<u8>,
    pub duration_ms: i64,
    pub mime_type: String,
    pub size_bytes: i64,
}

/// Fields for creating a recording; size_bytes is derived from the payload
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub patient_id: i64,
    /// Capture time; stamped by the store when absent
    pub recorded_at: Option<DateTime<Utc>>,
    pub audio_data: Vec<u8>,
    pub duration_ms: i64,
    pub mime_type: String,
}

/// Recording metadata without the audio payload (listings, export)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMeta {
    pub id: i64,
    pub patient_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl From<&Recording> for RecordingMeta {
    fn from(r: &Recording) -> Self {
        Self {
            id: r.id,
            patient_id: r.patient_id,
            recorded_at: r.recorded_at,
            duration_ms: r.duration_ms,
            mime_type: r.mime_type.clone(),
            size_bytes: r.size_bytes,
        }
    }
}

/// A test assignment linking a patient to a chosen set of test types
///
/// The id doubles as the shareable code handed to the patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAssignment {
    pub id: String,
    pub patient_id: i64,
    pub test_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Search criteria for patients; all filters optional
#[derive(Debug, Clone, Default)]
pub struct PatientSearch {
    /// Case-insensitive substring match on first name
    pub first_name: Option<String>,
    /// Case-insensitive substring match on last name
    pub last_name: Option<String>,
    /// Exact date-of-birth match (YYYY-MM-DD)
    pub date_of_birth: Option<String>,
    /// Maximum results (default 50)
    pub limit: Option<usize>,
}

/// Sort order for recording listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Ascending
    }
}

/// Aggregate counts over the whole database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_patients: i64,
    pub total_recordings: i64,
    pub total_assignments: i64,
    /// Sum of recording payload bytes
    pub total_storage_bytes: i64,
    pub oldest_patient_created_at: Option<DateTime<Utc>>,
    pub newest_patient_created_at: Option<DateTime<Utc>>,
}
