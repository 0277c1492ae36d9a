//! Record store integration tests
//!
//! Runs against an in-memory SQLite database with the real schema.

use chrono::{Datelike, Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use clinvox_common::db::models::{NewPatient, NewRecording, PatientSearch, SortOrder};
use clinvox_common::db::{create_schema, RecordStore};
use clinvox_common::Error;

/// Create a store backed by an in-memory database with the full schema
///
/// A single connection keeps every query on the same in-memory database.
async fn test_store() -> RecordStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    create_schema(&pool).await.expect("failed to create schema");
    RecordStore::new(pool)
}

fn sample_patient(first: &str, last: &str) -> NewPatient {
    NewPatient {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: "1970-01-01".to_string(),
        gender: "F".to_string(),
        ..Default::default()
    }
}

fn sample_recording(patient_id: i64, bytes: usize, duration_ms: i64) -> NewRecording {
    NewRecording {
        patient_id,
        recorded_at: None,
        audio_data: vec![0x5a; bytes],
        duration_ms,
        mime_type: "audio/webm".to_string(),
    }
}

#[tokio::test]
async fn add_then_get_patient_round_trips_fields() {
    let store = test_store().await;

    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();
    assert!(id > 0);

    let patient = store.get_patient(id).await.unwrap().expect("patient");
    assert_eq!(patient.first_name, "Ann");
    assert_eq!(patient.last_name, "Lee");
    assert_eq!(patient.date_of_birth, "1970-01-01");
    assert_eq!(patient.gender, "F");
    // created_at is stamped by the store and must be recent
    assert!(Utc::now() - patient.created_at < Duration::seconds(30));
    assert_eq!(patient.created_at.year(), Utc::now().year());
    assert!(patient.updated_at.is_none());
}

#[tokio::test]
async fn get_missing_patient_is_none_not_error() {
    let store = test_store().await;
    assert!(store.get_patient(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn add_patient_requires_names() {
    let store = test_store().await;

    let result = store.add_patient(sample_patient("", "Lee")).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let result = store.add_patient(sample_patient("Ann", "   ")).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn update_patient_overwrites_and_stamps() {
    let store = test_store().await;
    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();

    let mut patient = store.get_patient(id).await.unwrap().unwrap();
    patient.phone = Some("555-0142".to_string());
    patient.last_name = "Lee-Park".to_string();
    store.update_patient(&patient).await.unwrap();

    let reloaded = store.get_patient(id).await.unwrap().unwrap();
    assert_eq!(reloaded.last_name, "Lee-Park");
    assert_eq!(reloaded.phone.as_deref(), Some("555-0142"));
    assert!(reloaded.updated_at.is_some());
}

#[tokio::test]
async fn update_missing_patient_is_not_found() {
    let store = test_store().await;
    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();
    let mut patient = store.get_patient(id).await.unwrap().unwrap();
    patient.id = 4242;

    let result = store.update_patient(&patient).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn search_filters_case_insensitively_newest_first() {
    let store = test_store().await;
    store
        .add_patient(sample_patient("Joanna", "Smith"))
        .await
        .unwrap();
    store
        .add_patient(sample_patient("Mark", "Jones"))
        .await
        .unwrap();
    let late_id = store
        .add_patient(sample_patient("jody", "Brown"))
        .await
        .unwrap();

    let results = store
        .search_patients(&PatientSearch {
            first_name: Some("Jo".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    // Newest-created first
    assert_eq!(results[0].id, late_id);
    assert!(results
        .iter()
        .all(|p| p.first_name.to_lowercase().contains("jo")));
}

#[tokio::test]
async fn search_respects_limit_and_dob_filter() {
    let store = test_store().await;
    for i in 0..5 {
        store
            .add_patient(sample_patient(&format!("Ann{}", i), "Lee"))
            .await
            .unwrap();
    }
    let mut other = sample_patient("Bea", "Holt");
    other.date_of_birth = "1980-06-15".to_string();
    store.add_patient(other).await.unwrap();

    let limited = store
        .search_patients(&PatientSearch {
            last_name: Some("lee".to_string()),
            limit: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 3);

    let by_dob = store
        .search_patients(&PatientSearch {
            date_of_birth: Some("1980-06-15".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_dob.len(), 1);
    assert_eq!(by_dob[0].first_name, "Bea");
}

#[tokio::test]
async fn recordings_sort_by_capture_time_in_requested_order() {
    let store = test_store().await;
    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();

    let base = Utc::now();
    for offset in [2i64, 0, 1] {
        let mut rec = sample_recording(id, 100, 1000);
        rec.recorded_at = Some(base + Duration::seconds(offset));
        store.add_recording(rec).await.unwrap();
    }
    // A recording for another patient must not leak into the listing
    let other = store
        .add_patient(sample_patient("Bea", "Holt"))
        .await
        .unwrap();
    store
        .add_recording(sample_recording(other, 50, 500))
        .await
        .unwrap();

    let ascending = store
        .get_patient_recordings(id, SortOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(ascending.len(), 3);
    assert!(ascending.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));

    let descending = store
        .get_patient_recordings(id, SortOrder::Descending)
        .await
        .unwrap();
    assert!(descending
        .windows(2)
        .all(|w| w[0].recorded_at >= w[1].recorded_at));
}

#[tokio::test]
async fn add_recording_validates_reference_and_payload() {
    let store = test_store().await;

    let result = store.add_recording(sample_recording(0, 100, 1000)).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let result = store.add_recording(sample_recording(1, 0, 1000)).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn delete_patient_cascades_to_recordings_and_assignments() {
    let store = test_store().await;
    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();
    store
        .add_recording(sample_recording(id, 100, 1000))
        .await
        .unwrap();
    store
        .add_recording(sample_recording(id, 200, 2000))
        .await
        .unwrap();
    store
        .add_assignment(id, &["reading_passage".to_string()], "CVX-TEST01")
        .await
        .unwrap();

    store.delete_patient(id).await.unwrap();

    assert!(store.get_patient(id).await.unwrap().is_none());
    assert!(store
        .get_patient_recordings(id, SortOrder::Ascending)
        .await
        .unwrap()
        .is_empty());
    assert!(store.get_patient_assignments(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_patient_is_not_found() {
    let store = test_store().await;
    let result = store.delete_patient(77).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn assignment_round_trips_test_types() {
    let store = test_store().await;
    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();
    let types = vec![
        "sustained_vowel".to_string(),
        "reading_passage".to_string(),
    ];

    let assignment = store.add_assignment(id, &types, "CVX-AB12CD").await.unwrap();
    assert_eq!(assignment.patient_id, id);

    let loaded = store.get_assignment("CVX-AB12CD").await.unwrap().unwrap();
    assert_eq!(loaded.test_types, types);

    let listed = store.get_patient_assignments(id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "CVX-AB12CD");
}

#[tokio::test]
async fn stats_report_counts_bytes_and_age_range() {
    let store = test_store().await;

    let empty = store.database_stats().await.unwrap();
    assert_eq!(empty.total_patients, 0);
    assert_eq!(empty.total_storage_bytes, 0);
    assert!(empty.oldest_patient_created_at.is_none());

    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();
    store
        .add_recording(sample_recording(id, 10_000, 5000))
        .await
        .unwrap();

    let stats = store.database_stats().await.unwrap();
    assert_eq!(stats.total_patients, 1);
    assert_eq!(stats.total_recordings, 1);
    assert_eq!(stats.total_storage_bytes, 10_000);
    assert_eq!(
        stats.oldest_patient_created_at,
        stats.newest_patient_created_at
    );
    assert!(stats.oldest_patient_created_at.is_some());
}

#[tokio::test]
async fn clear_database_empties_everything() {
    let store = test_store().await;
    let id = store
        .add_patient(sample_patient("Ann", "Lee"))
        .await
        .unwrap();
    store
        .add_recording(sample_recording(id, 128, 750))
        .await
        .unwrap();

    store.clear_database().await.unwrap();

    let stats = store.database_stats().await.unwrap();
    assert_eq!(stats.total_patients, 0);
    assert_eq!(stats.total_recordings, 0);
    assert_eq!(stats.total_assignments, 0);
    assert_eq!(stats.total_storage_bytes, 0);
}
