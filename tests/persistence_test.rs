#![cfg(feature = "storage-rocksdb")]

use buildemy_checkout::domain::enrollment::EnrollmentStatus;
use buildemy_checkout::domain::money::Amount;
use buildemy_checkout::domain::ports::EnrollmentStore;
use buildemy_checkout::error::EnrollmentError;
use buildemy_checkout::infrastructure::rocksdb::RocksDbEnrollmentStore;
use tempfile::tempdir;

#[tokio::test]
async fn test_activation_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("enrollments_db");

    // First process: initiate and activate.
    let enrollment_id = {
        let store = RocksDbEnrollmentStore::open(&db_path).unwrap();
        let enrollment = store
            .upsert_pending("u1", "c1", Amount::new(1000).unwrap())
            .await
            .unwrap();
        store.activate(enrollment.id).await.unwrap();
        enrollment.id
    };

    // Second process: the Active row is still there and still guarded.
    let store = RocksDbEnrollmentStore::open(&db_path).unwrap();
    let found = store.find("u1", "c1").await.unwrap().unwrap();
    assert_eq!(found.id, enrollment_id);
    assert_eq!(found.status, EnrollmentStatus::Active);

    let result = store.upsert_pending("u1", "c1", Amount::new(1).unwrap()).await;
    assert!(matches!(result, Err(EnrollmentError::AlreadyEnrolled)));
}

#[tokio::test]
async fn test_pending_row_survives_crash_before_callback() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("enrollments_db");

    let enrollment_id = {
        let store = RocksDbEnrollmentStore::open(&db_path).unwrap();
        store
            .upsert_pending("u1", "c1", Amount::new(1000).unwrap())
            .await
            .unwrap()
            .id
    };

    // A crash between redirect and callback leaves the row Pending; the
    // late callback can still activate it after restart.
    let store = RocksDbEnrollmentStore::open(&db_path).unwrap();
    let found = store.find("u1", "c1").await.unwrap().unwrap();
    assert_eq!(found.status, EnrollmentStatus::Pending);

    let activated = store.activate(enrollment_id).await.unwrap();
    assert_eq!(activated.status, EnrollmentStatus::Active);
}
