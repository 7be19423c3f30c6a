use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::ports::{CheckoutProviderRef, SessionRequest, UserDirectoryRef};
use crate::domain::user::User;
use crate::error::{EnrollmentError, Result};
use crate::gateway::{PaymentGateway, RedirectInstruction};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Hosted-checkout adapter (Stripe-shaped).
///
/// Ensures a provider-side customer exists for the user, creates a checkout
/// session scoped to the course's price reference and returns its redirect
/// URL. The session carries `{userId, courseId, enrollmentId}` as opaque
/// metadata so reconciliation can recover the course from a `session_id`
/// alone.
pub struct HostedCheckoutGateway {
    provider: CheckoutProviderRef,
    users: UserDirectoryRef,
    base_url: String,
}

impl HostedCheckoutGateway {
    pub fn new(provider: CheckoutProviderRef, users: UserDirectoryRef, base_url: String) -> Self {
        Self {
            provider,
            users,
            base_url,
        }
    }

    /// Returns the cached customer id, creating and persisting one on first
    /// use. Re-reads the directory so a concurrent checkout that already
    /// created the customer is picked up.
    async fn ensure_customer(&self, user: &User) -> Result<String> {
        let fresh = self
            .users
            .get(&user.id)
            .await?
            .ok_or(EnrollmentError::EnrollmentFailed)?;

        if let Some(customer_id) = fresh.stripe_customer_id {
            return Ok(customer_id);
        }

        let customer_id = self
            .provider
            .create_customer(&user.email, &user.name, &user.id)
            .await?;
        self.users.set_customer_id(&user.id, &customer_id).await?;
        debug!(user_id = %user.id, "created provider customer");
        Ok(customer_id)
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn initiate(
        &self,
        enrollment: &Enrollment,
        course: &Course,
        user: &User,
    ) -> Result<RedirectInstruction> {
        let price_id = course
            .stripe_price_id
            .as_deref()
            .ok_or_else(|| EnrollmentError::NotPurchasable {
                method: "Stripe".to_string(),
            })?;

        let customer_id = self.ensure_customer(user).await?;

        let mut metadata = HashMap::new();
        metadata.insert("userId".to_string(), user.id.clone());
        metadata.insert("courseId".to_string(), course.id.clone());
        metadata.insert("enrollmentId".to_string(), enrollment.id.to_string());

        let session = self
            .provider
            .create_session(SessionRequest {
                customer_id,
                price_id: price_id.to_string(),
                success_url: format!(
                    "{}/payment/success?courseId={}",
                    self.base_url, course.id
                ),
                cancel_url: format!("{}/payment/cancel", self.base_url),
                metadata,
            })
            .await?;

        let url = session.url.ok_or_else(|| EnrollmentError::PaymentProviderError {
            message: format!("checkout session {} has no redirect url", session.id),
        })?;

        Ok(RedirectInstruction::HostedCheckout { url })
    }
}
