//! Patient management workflow
//!
//! Field validation happens here, before any store call; the store itself
//! only enforces the non-blank name rule. Violations come back as one
//! [`ValidationError`] carrying every offending field, so a form can mark
//! them all at once.

use crate::error::{Error, FieldError, Result, ValidationError};
use chrono::{NaiveDate, Utc};
use clinvox_common::db::models::{NewPatient, Patient, PatientSearch};
use clinvox_common::RecordStore;
use tracing::info;

/// Configurable validation bounds for patient fields
#[derive(Debug, Clone)]
pub struct PatientRules {
    pub name_min_chars: usize,
    pub name_max_chars: usize,
    pub age_min_years: u32,
    pub age_max_years: u32,
    pub genders: &'static [&'static str],
}

impl Default for PatientRules {
    fn default() -> Self {
        Self {
            name_min_chars: 2,
            name_max_chars: 50,
            age_min_years: 0,
            age_max_years: 120,
            genders: &["F", "M", "X"],
        }
    }
}

/// Form-driven CRUD over patient records
#[derive(Debug, Clone)]
pub struct PatientWorkflow {
    store: RecordStore,
    rules: PatientRules,
}

impl PatientWorkflow {
    pub fn new(store: RecordStore) -> Self {
        Self::with_rules(store, PatientRules::default())
    }

    pub fn with_rules(store: RecordStore, rules: PatientRules) -> Self {
        Self { store, rules }
    }

    /// Validate and create a patient, returning the new id
    pub async fn create(&self, new: NewPatient) -> Result<i64> {
        validate_patient_fields(
            &new.first_name,
            &new.last_name,
            &new.date_of_birth,
            &new.gender,
            &self.rules,
        )?;
        let id = self.store.add_patient(new).await?;
        info!("Created patient {}", id);
        Ok(id)
    }

    /// Validate and overwrite an existing patient
    ///
    /// Callers merge edited fields into the loaded record before calling;
    /// the store does a full-row overwrite.
    pub async fn update(&self, patient: &Patient) -> Result<()> {
        validate_patient_fields(
            &patient.first_name,
            &patient.last_name,
            &patient.date_of_birth,
            &patient.gender,
            &self.rules,
        )?;
        self.store.update_patient(patient).await?;
        Ok(())
    }

    /// Delete a patient along with its recordings and assignments
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_patient(id).await?;
        Ok(())
    }

    pub async fn find(&self, id: i64) -> Result<Option<Patient>> {
        Ok(self.store.get_patient(id).await?)
    }

    pub async fn search(&self, criteria: &PatientSearch) -> Result<Vec<Patient>> {
        Ok(self.store.search_patients(criteria).await?)
    }
}

/// Apply the configured field rules; all violations are collected
pub fn validate_patient_fields(
    first_name: &str,
    last_name: &str,
    date_of_birth: &str,
    gender: &str,
    rules: &PatientRules,
) -> std::result::Result<(), Error> {
    let mut fields = Vec::new();

    check_name(&mut fields, "first_name", first_name, rules);
    check_name(&mut fields, "last_name", last_name, rules);
    check_date_of_birth(&mut fields, date_of_birth, rules);

    if gender.trim().is_empty() {
        fields.push(FieldError {
            field: "gender",
            message: "a selection is required".to_string(),
        });
    } else if !rules.genders.contains(&gender) {
        fields.push(FieldError {
            field: "gender",
            message: format!("must be one of {}", rules.genders.join(", ")),
        });
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields }.into())
    }
}

fn check_name(fields: &mut Vec<FieldError>, field: &'static str, value: &str, rules: &PatientRules) {
    let chars = value.trim().chars().count();
    if chars < rules.name_min_chars || chars > rules.name_max_chars {
        fields.push(FieldError {
            field,
            message: format!(
                "must be between {} and {} characters",
                rules.name_min_chars, rules.name_max_chars
            ),
        });
    }
}

fn check_date_of_birth(fields: &mut Vec<FieldError>, value: &str, rules: &PatientRules) {
    if value.trim().is_empty() {
        fields.push(FieldError {
            field: "date_of_birth",
            message: "is required".to_string(),
        });
        return;
    }

    let dob = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            fields.push(FieldError {
                field: "date_of_birth",
                message: "must be a valid date (YYYY-MM-DD)".to_string(),
            });
            return;
        }
    };

    // Age at validation time; dates in the future have no derivable age
    match Utc::now().date_naive().years_since(dob) {
        Some(age) if age >= rules.age_min_years && age <= rules.age_max_years => {}
        Some(_) => fields.push(FieldError {
            field: "date_of_birth",
            message: format!(
                "age must be between {} and {} years",
                rules.age_min_years, rules.age_max_years
            ),
        }),
        None => fields.push(FieldError {
            field: "date_of_birth",
            message: "cannot be in the future".to_string(),
        }),
    }
}
