//! Test assignment workflow
//!
//! Associates a patient with a chosen subset of voice-test types and mints
//! the shareable code the patient uses to identify the assignment.

use crate::error::{Error, FieldError, Result, ValidationError};
use clinvox_common::db::models::TestAssignment;
use clinvox_common::{Error as StoreError, RecordStore};
use rand::Rng;
use tracing::info;

/// The known voice-test type identifiers
pub const TEST_TYPES: &[&str] = &[
    "sustained_vowel",
    "reading_passage",
    "spontaneous_speech",
    "counting",
    "maximum_phonation",
];

/// Share codes avoid visually ambiguous characters (0/O, 1/I/L)
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 8;

/// Creates test assignments with shareable codes
#[derive(Debug, Clone)]
pub struct AssignmentWorkflow {
    store: RecordStore,
}

impl AssignmentWorkflow {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Assign a set of test types to a patient
    ///
    /// The selection must be a non-empty subset of [`TEST_TYPES`] and the
    /// patient must exist. Returns the stored assignment, whose id is the
    /// freshly minted share code.
    pub async fn assign(&self, patient_id: i64, test_types: Vec<String>) -> Result<TestAssignment> {
        validate_test_types(&test_types)?;

        if self.store.get_patient(patient_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("patient {}", patient_id)).into());
        }

        let share_code = mint_share_code();
        let assignment = self
            .store
            .add_assignment(patient_id, &test_types, &share_code)
            .await?;

        info!(
            "Assigned {} test(s) to patient {} as {}",
            assignment.test_types.len(),
            patient_id,
            share_code
        );
        Ok(assignment)
    }

    /// Look up an assignment by its share code
    pub async fn find_by_code(&self, share_code: &str) -> Result<Option<TestAssignment>> {
        Ok(self.store.get_assignment(share_code).await?)
    }

    /// All assignments for a patient, newest first
    pub async fn list(&self, patient_id: i64) -> Result<Vec<TestAssignment>> {
        Ok(self.store.get_patient_assignments(patient_id).await?)
    }
}

fn validate_test_types(test_types: &[String]) -> std::result::Result<(), Error> {
    let mut fields = Vec::new();

    if test_types.is_empty() {
        fields.push(FieldError {
            field: "test_types",
            message: "select at least one test".to_string(),
        });
    }
    for unknown in test_types
        .iter()
        .filter(|t| !TEST_TYPES.contains(&t.as_str()))
    {
        fields.push(FieldError {
            field: "test_types",
            message: format!("unknown test type '{}'", unknown),
        });
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields }.into())
    }
}

/// Mint a shareable assignment code, e.g. `CVX-7KQ2MRW4`
fn mint_share_code() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("CVX-{}", code)
}
