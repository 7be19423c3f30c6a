use crate::domain::money::Amount;
use crate::error::{EnrollmentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum EnrollmentStatus {
    Pending,
    Active,
    Cancelled,
}

/// One user's claim on one course.
///
/// At most one enrollment exists per `(user_id, course_id)` pair; repeated
/// checkout attempts reuse the row, keeping the `id` stable. Only `Active`
/// grants course access and it is terminal: nothing ever writes over it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: String,
    pub course_id: String,
    /// Price at the time of the most recent initiation, in minor units.
    pub amount: Amount,
    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Creates a fresh `Pending` enrollment for a first checkout attempt.
    pub fn pending(user_id: &str, course_id: &str, amount: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            amount,
            status: EnrollmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// Restarts checkout on an existing row: latest price wins, status goes
    /// back to `Pending`, the id is preserved. Refused once `Active`.
    pub fn reset_pending(&mut self, amount: Amount, now: DateTime<Utc>) -> Result<()> {
        if self.is_active() {
            return Err(EnrollmentError::AlreadyEnrolled);
        }
        self.amount = amount;
        self.status = EnrollmentStatus::Pending;
        self.updated_at = now;
        Ok(())
    }

    /// Flips `Pending` to `Active`. Returns `false` without touching the row
    /// when it is already `Active`, so repeated reconciliation is a no-op.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<bool> {
        match self.status {
            EnrollmentStatus::Active => Ok(false),
            EnrollmentStatus::Pending => {
                self.status = EnrollmentStatus::Active;
                self.updated_at = now;
                Ok(true)
            }
            EnrollmentStatus::Cancelled => Err(EnrollmentError::Validation(
                "cannot activate a cancelled enrollment".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Enrollment {
        Enrollment::pending("user-1", "course-1", Amount::new(1000).unwrap())
    }

    #[test]
    fn test_activate_pending() {
        let mut enrollment = pending();
        let changed = enrollment.activate(Utc::now()).unwrap();
        assert!(changed);
        assert_eq!(enrollment.status, EnrollmentStatus::Active);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut enrollment = pending();
        enrollment.activate(Utc::now()).unwrap();
        let updated_at = enrollment.updated_at;

        let changed = enrollment.activate(Utc::now()).unwrap();
        assert!(!changed);
        assert_eq!(enrollment.updated_at, updated_at);
    }

    #[test]
    fn test_activate_cancelled_is_refused() {
        let mut enrollment = pending();
        enrollment.status = EnrollmentStatus::Cancelled;
        assert!(matches!(
            enrollment.activate(Utc::now()),
            Err(EnrollmentError::Validation(_))
        ));
    }

    #[test]
    fn test_reset_pending_keeps_id_and_takes_latest_amount() {
        let mut enrollment = pending();
        let id = enrollment.id;
        enrollment
            .reset_pending(Amount::new(2500).unwrap(), Utc::now())
            .unwrap();
        assert_eq!(enrollment.id, id);
        assert_eq!(enrollment.amount.value(), 2500);
        assert_eq!(enrollment.status, EnrollmentStatus::Pending);
    }

    #[test]
    fn test_reset_pending_never_overwrites_active() {
        let mut enrollment = pending();
        enrollment.activate(Utc::now()).unwrap();
        assert!(matches!(
            enrollment.reset_pending(Amount::new(1).unwrap(), Utc::now()),
            Err(EnrollmentError::AlreadyEnrolled)
        ));
        assert!(enrollment.is_active());
    }
}
