use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::money::Amount;
use crate::domain::ports::{
    CheckoutProvider, CheckoutSession, CourseCatalog, EnrollmentStore, RateLimiter,
    SessionRequest, UserDirectory,
};
use crate::domain::user::User;
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

type PairKey = (String, String);

#[derive(Default)]
struct EnrollmentMaps {
    by_pair: HashMap<PairKey, Enrollment>,
    by_id: HashMap<Uuid, PairKey>,
}

/// Thread-safe in-memory enrollment store.
///
/// The write lock serializes racing upserts for the same pair, so the
/// composite-key uniqueness invariant holds structurally and the last
/// writer wins on amount/status.
#[derive(Default, Clone)]
pub struct InMemoryEnrollmentStore {
    inner: Arc<RwLock<EnrollmentMaps>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn find(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>> {
        let maps = self.inner.read().await;
        Ok(maps
            .by_pair
            .get(&(user_id.to_string(), course_id.to_string()))
            .cloned())
    }

    async fn upsert_pending(
        &self,
        user_id: &str,
        course_id: &str,
        amount: Amount,
    ) -> Result<Enrollment> {
        let mut maps = self.inner.write().await;
        let key = (user_id.to_string(), course_id.to_string());

        if let Some(existing) = maps.by_pair.get_mut(&key) {
            existing.reset_pending(amount, Utc::now())?;
            return Ok(existing.clone());
        }

        let enrollment = Enrollment::pending(user_id, course_id, amount);
        maps.by_id.insert(enrollment.id, key.clone());
        maps.by_pair.insert(key, enrollment.clone());
        Ok(enrollment)
    }

    async fn activate(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        let mut maps = self.inner.write().await;
        let key = maps
            .by_id
            .get(&enrollment_id)
            .cloned()
            .ok_or(EnrollmentError::EnrollmentNotFound)?;
        let enrollment = maps
            .by_pair
            .get_mut(&key)
            .ok_or(EnrollmentError::EnrollmentNotFound)?;
        enrollment.activate(Utc::now())?;
        Ok(enrollment.clone())
    }
}

/// In-memory course catalog, seeded from CSV at startup.
#[derive(Default, Clone)]
pub struct InMemoryCourseCatalog {
    courses: Arc<RwLock<HashMap<String, Course>>>,
}

impl InMemoryCourseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, course: Course) {
        let mut courses = self.courses.write().await;
        courses.insert(course.id.clone(), course);
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn get(&self, course_id: &str) -> Result<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(course_id).cloned())
    }
}

#[derive(Default)]
struct UserMaps {
    by_id: HashMap<String, User>,
    by_token: HashMap<String, String>,
}

/// In-memory user directory doubling as the session authenticator:
/// each seeded user carries one bearer token.
#[derive(Default, Clone)]
pub struct InMemoryUserDirectory {
    inner: Arc<RwLock<UserMaps>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User, token: &str) {
        let mut maps = self.inner.write().await;
        maps.by_token.insert(token.to_string(), user.id.clone());
        maps.by_id.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, user_id: &str) -> Result<Option<User>> {
        let maps = self.inner.read().await;
        Ok(maps.by_id.get(user_id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let maps = self.inner.read().await;
        Ok(maps
            .by_token
            .get(token)
            .and_then(|user_id| maps.by_id.get(user_id))
            .cloned())
    }

    async fn set_customer_id(&self, user_id: &str, customer_id: &str) -> Result<()> {
        let mut maps = self.inner.write().await;
        let user = maps
            .by_id
            .get_mut(user_id)
            .ok_or_else(|| EnrollmentError::Storage(format!("unknown user {user_id}")))?;
        user.stripe_customer_id = Some(customer_id.to_string());
        Ok(())
    }
}

/// Fixed-window in-process rate limiter keyed by caller fingerprint.
pub struct FixedWindowRateLimiter {
    window: Duration,
    max_attempts: u32,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindowRateLimiter {
    pub fn new(window: Duration, max_attempts: u32) -> Self {
        Self {
            window,
            max_attempts,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiter for FixedWindowRateLimiter {
    async fn check_and_consume(&self, fingerprint: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        // Evict every elapsed window so the map tracks active fingerprints
        // only, not every user ever seen.
        windows.retain(|_, (started, _)| now.duration_since(*started) < self.window);
        let entry = windows
            .entry(fingerprint.to_string())
            .or_insert((now, 0));
        if entry.1 >= self.max_attempts {
            false
        } else {
            entry.1 += 1;
            true
        }
    }
}

/// Simulated hosted-checkout provider, used in tests and whenever no
/// provider API key is configured. Sessions live in memory and behave like
/// the real thing for metadata recovery.
#[derive(Default, Clone)]
pub struct SimulatedCheckoutProvider {
    sessions: Arc<RwLock<HashMap<String, CheckoutSession>>>,
    customers_created: Arc<RwLock<u32>>,
}

impl SimulatedCheckoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn customers_created(&self) -> u32 {
        *self.customers_created.read().await
    }
}

#[async_trait]
impl CheckoutProvider for SimulatedCheckoutProvider {
    async fn create_customer(&self, _email: &str, _name: &str, _user_id: &str) -> Result<String> {
        let mut count = self.customers_created.write().await;
        *count += 1;
        Ok(format!("cus_{}", Uuid::new_v4().simple()))
    }

    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession> {
        let id = format!("cs_{}", Uuid::new_v4().simple());
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://checkout.simulated.local/c/{id}")),
            metadata: request.metadata,
        };
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| EnrollmentError::PaymentProviderError {
                message: format!("no such session {session_id}"),
            })
    }
}
