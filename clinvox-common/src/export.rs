//! JSON export of the clinic dataset
//!
//! Produces a single document containing all patient records and all
//! recording metadata. Audio payloads are intentionally omitted; the export
//! is for record review and transfer, not audio backup.

use crate::db::models::RecordingMeta;
use crate::db::store::RecordStore;
use crate::{db::models::Patient, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub patients: Vec<Patient>,
    pub recordings: Vec<RecordingMeta>,
}

/// Build an export document from everything currently in the store
pub async fn export_document(store: &RecordStore) -> Result<ExportDocument> {
    let patients = store.list_patients().await?;
    let recordings = store
        .list_recordings()
        .await?
        .iter()
        .map(RecordingMeta::from)
        .collect();

    Ok(ExportDocument {
        exported_at: Utc::now(),
        patients,
        recordings,
    })
}

/// Serialize an export document to pretty-printed JSON
pub fn to_json(document: &ExportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
