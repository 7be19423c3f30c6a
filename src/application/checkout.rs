use crate::domain::ports::{CourseCatalogRef, EnrollmentStoreRef, RateLimiterRef};
use crate::domain::user::User;
use crate::error::{EnrollmentError, Result};
use crate::gateway::{GatewayRegistry, PaymentMethod, RedirectInstruction};
use tracing::{error, info};

/// Orchestrates one checkout initiation per `(user, course)` pair:
/// rate limit, active-enrollment guard, pending upsert at current price,
/// adapter dispatch. Performs no further action until reconciliation.
pub struct CheckoutService {
    courses: CourseCatalogRef,
    enrollments: EnrollmentStoreRef,
    rate_limiter: RateLimiterRef,
    gateways: GatewayRegistry,
}

impl CheckoutService {
    pub fn new(
        courses: CourseCatalogRef,
        enrollments: EnrollmentStoreRef,
        rate_limiter: RateLimiterRef,
        gateways: GatewayRegistry,
    ) -> Self {
        Self {
            courses,
            enrollments,
            rate_limiter,
            gateways,
        }
    }

    pub async fn begin_checkout(
        &self,
        user: &User,
        course_id: &str,
        method: PaymentMethod,
    ) -> Result<RedirectInstruction> {
        if !self.rate_limiter.check_and_consume(&user.id).await {
            return Err(EnrollmentError::RateLimited);
        }

        let course = self
            .courses
            .get(course_id)
            .await
            .map_err(mask_internal)?
            .ok_or(EnrollmentError::CourseNotFound)?;

        // Idempotent guard against double payment: a completed purchase is
        // never reset to Pending.
        if let Some(existing) = self
            .enrollments
            .find(&user.id, course_id)
            .await
            .map_err(mask_internal)?
            && existing.is_active()
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let gateway = self.gateways.get(method).ok_or_else(|| {
            EnrollmentError::NotPurchasable {
                method: method.to_string(),
            }
        })?;

        // Price is re-read above on every initiation; the pending row keeps
        // whatever it was created with until the next restart.
        let enrollment = self
            .enrollments
            .upsert_pending(&user.id, course_id, course.price)
            .await
            .map_err(mask_internal)?;

        info!(
            user_id = %user.id,
            course_id = %course.id,
            enrollment_id = %enrollment.id,
            %method,
            "checkout initiated"
        );

        gateway.initiate(&enrollment, &course, user).await
    }
}

/// Internal failures are logged here and replaced by the generic
/// `EnrollmentFailed` before they reach the caller; the user-facing
/// taxonomy passes through untouched.
fn mask_internal(err: EnrollmentError) -> EnrollmentError {
    match &err {
        EnrollmentError::Storage(_) | EnrollmentError::Io(_) | EnrollmentError::Csv(_) => {
            error!("checkout internal failure: {err}");
            EnrollmentError::EnrollmentFailed
        }
        _ => err,
    }
}
