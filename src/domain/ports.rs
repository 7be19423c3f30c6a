use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::money::Amount;
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub type EnrollmentStoreRef = Arc<dyn EnrollmentStore>;
pub type CourseCatalogRef = Arc<dyn CourseCatalog>;
pub type UserDirectoryRef = Arc<dyn UserDirectory>;
pub type CheckoutProviderRef = Arc<dyn CheckoutProvider>;
pub type RateLimiterRef = Arc<dyn RateLimiter>;

/// Persistence boundary for enrollment rows, keyed by `(user_id, course_id)`.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>>;

    /// Creates or resets the pair's row to `Pending` with the given amount.
    /// Fails with `AlreadyEnrolled` (no write) when the row is `Active`.
    async fn upsert_pending(
        &self,
        user_id: &str,
        course_id: &str,
        amount: Amount,
    ) -> Result<Enrollment>;

    /// Flips the row to `Active`. No-op success when already `Active`;
    /// `EnrollmentNotFound` for an unknown id.
    async fn activate(&self, enrollment_id: Uuid) -> Result<Enrollment>;
}

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn get(&self, course_id: &str) -> Result<Option<Course>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<User>>;
    /// Resolves a bearer session token to its user.
    async fn find_by_token(&self, token: &str) -> Result<Option<User>>;
    async fn set_customer_id(&self, user_id: &str, customer_id: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// The hosted payment provider's API surface used by this core.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_customer(&self, email: &str, name: &str, user_id: &str) -> Result<String>;
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession>;
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession>;
}

/// Swappable rate-limiting primitive, keyed by a caller fingerprint.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_and_consume(&self, fingerprint: &str) -> bool;
}
