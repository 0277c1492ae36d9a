//! Recording persistence workflow
//!
//! Saving is a distinct, user-triggered step after a capture session stops;
//! a finished capture held in memory is lost unless it passes through here.

use crate::capture::FinishedCapture;
use crate::error::Result;
use clinvox_common::db::models::{NewRecording, Recording, SortOrder};
use clinvox_common::{Error as StoreError, RecordStore};
use tracing::info;

/// Persists finished capture sessions against patients
#[derive(Debug, Clone)]
pub struct RecordingWorkflow {
    store: RecordStore,
}

impl RecordingWorkflow {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Save a finished capture for a patient, returning the recording id
    ///
    /// The patient must exist at save time; after that the reference is by
    /// convention only.
    pub async fn save(&self, patient_id: i64, capture: FinishedCapture) -> Result<i64> {
        if self.store.get_patient(patient_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("patient {}", patient_id)).into());
        }

        let id = self
            .store
            .add_recording(NewRecording {
                patient_id,
                recorded_at: None,
                audio_data: capture.audio,
                duration_ms: capture.duration_ms,
                mime_type: capture.mime_type,
            })
            .await?;

        info!("Saved recording {} for patient {}", id, patient_id);
        Ok(id)
    }

    /// All recordings for a patient in the requested capture-time order
    pub async fn list(&self, patient_id: i64, order: SortOrder) -> Result<Vec<Recording>> {
        Ok(self.store.get_patient_recordings(patient_id, order).await?)
    }
}
