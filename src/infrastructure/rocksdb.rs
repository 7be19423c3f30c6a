use crate::domain::enrollment::Enrollment;
use crate::domain::money::Amount;
use crate::domain::ports::EnrollmentStore;
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column family for enrollment rows, keyed by the composite pair key.
pub const CF_ENROLLMENTS: &str = "enrollments";
/// Column family mapping enrollment id to its composite pair key.
pub const CF_ENROLLMENT_IDS: &str = "enrollment_ids";

/// Persistent enrollment store backed by RocksDB.
///
/// Rows are JSON-encoded under `user_id\x1fcourse_id`; the id index makes
/// `activate` resolvable without a scan. RocksDB writes are atomic per key
/// but the upsert/activate paths are read-modify-write, so a single async
/// mutex serializes them. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbEnrollmentStore {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

fn pair_key(user_id: &str, course_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.len() + course_id.len() + 1);
    key.extend_from_slice(user_id.as_bytes());
    key.push(0x1f);
    key.extend_from_slice(course_id.as_bytes());
    key
}

impl RocksDbEnrollmentStore {
    /// Opens or creates the database at `path`, ensuring both column
    /// families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_enrollments = ColumnFamilyDescriptor::new(CF_ENROLLMENTS, Options::default());
        let cf_ids = ColumnFamilyDescriptor::new(CF_ENROLLMENT_IDS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_enrollments, cf_ids])?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| EnrollmentError::Storage(format!("column family {name} not found")))
    }

    fn read(&self, key: &[u8]) -> Result<Option<Enrollment>> {
        let cf = self.cf(CF_ENROLLMENTS)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => {
                let enrollment = serde_json::from_slice(&bytes).map_err(|e| {
                    EnrollmentError::Storage(format!("failed to decode enrollment: {e}"))
                })?;
                Ok(Some(enrollment))
            }
            None => Ok(None),
        }
    }

    fn write(&self, key: &[u8], enrollment: &Enrollment) -> Result<()> {
        let value = serde_json::to_vec(enrollment)
            .map_err(|e| EnrollmentError::Storage(format!("failed to encode enrollment: {e}")))?;
        self.db.put_cf(self.cf(CF_ENROLLMENTS)?, key, value)?;
        self.db
            .put_cf(self.cf(CF_ENROLLMENT_IDS)?, enrollment.id.as_bytes(), key)?;
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for RocksDbEnrollmentStore {
    async fn find(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>> {
        self.read(&pair_key(user_id, course_id))
    }

    async fn upsert_pending(
        &self,
        user_id: &str,
        course_id: &str,
        amount: Amount,
    ) -> Result<Enrollment> {
        let _guard = self.write_guard.lock().await;
        let key = pair_key(user_id, course_id);

        if let Some(mut existing) = self.read(&key)? {
            existing.reset_pending(amount, Utc::now())?;
            self.write(&key, &existing)?;
            return Ok(existing);
        }

        let enrollment = Enrollment::pending(user_id, course_id, amount);
        self.write(&key, &enrollment)?;
        Ok(enrollment)
    }

    async fn activate(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        let _guard = self.write_guard.lock().await;
        let key = self
            .db
            .get_cf(self.cf(CF_ENROLLMENT_IDS)?, enrollment_id.as_bytes())?
            .ok_or(EnrollmentError::EnrollmentNotFound)?;
        let mut enrollment = self.read(&key)?.ok_or(EnrollmentError::EnrollmentNotFound)?;

        if enrollment.activate(Utc::now())? {
            self.write(&key, &enrollment)?;
        }
        Ok(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn amount(value: u64) -> Amount {
        Amount::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDbEnrollmentStore::open(dir.path()).expect("failed to open RocksDB");
        assert!(store.db.cf_handle(CF_ENROLLMENTS).is_some());
        assert!(store.db.cf_handle(CF_ENROLLMENT_IDS).is_some());
    }

    #[tokio::test]
    async fn test_upsert_and_find_roundtrip() {
        let dir = tempdir().unwrap();
        let store = RocksDbEnrollmentStore::open(dir.path()).unwrap();

        let created = store.upsert_pending("u1", "c1", amount(1000)).await.unwrap();
        let found = store.find("u1", "c1").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find("u1", "c2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_activate_via_id_index_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = RocksDbEnrollmentStore::open(dir.path()).unwrap();

        let enrollment = store.upsert_pending("u1", "c1", amount(1000)).await.unwrap();
        let first = store.activate(enrollment.id).await.unwrap();
        assert!(first.is_active());

        let second = store.activate(enrollment.id).await.unwrap();
        assert_eq!(first.updated_at, second.updated_at);

        let result = store.upsert_pending("u1", "c1", amount(1)).await;
        assert!(matches!(result, Err(EnrollmentError::AlreadyEnrolled)));
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = RocksDbEnrollmentStore::open(dir.path()).unwrap();
            store.upsert_pending("u1", "c1", amount(1000)).await.unwrap().id
        };

        let store = RocksDbEnrollmentStore::open(dir.path()).unwrap();
        let found = store.find("u1", "c1").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.activate(id).await.unwrap().is_active());
    }
}
