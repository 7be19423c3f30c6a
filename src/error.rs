use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnrollmentError>;

/// Error taxonomy for the checkout and reconciliation core.
///
/// The first group is the user-facing taxonomy; every variant maps to a
/// stable end-user message via [`EnrollmentError::user_message`]. The second
/// group covers ambient plumbing (seed files, storage) and is always masked
/// as `EnrollmentFailed` before it crosses the service boundary.
#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("authentication required")]
    AuthRequired,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("already enrolled")]
    AlreadyEnrolled,
    #[error("course not found")]
    CourseNotFound,
    #[error("course not purchasable via {method}")]
    NotPurchasable { method: String },
    #[error("payment provider error: {message}")]
    PaymentProviderError { message: String },
    #[error("reconciliation failed: {reason}")]
    ReconciliationFailed { reason: String },
    #[error("enrollment not found")]
    EnrollmentNotFound,
    #[error("enrollment failed")]
    EnrollmentFailed,

    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnrollmentError {
    /// Text shown to the end user. Provider and internal messages are never
    /// passed through verbatim; callers log the original error instead.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => {
                "Authentication required or an internal error occurred while activating enrollment."
                    .to_string()
            }
            Self::RateLimited => "You have been blocked".to_string(),
            Self::AlreadyEnrolled => "You are already enrolled in this course".to_string(),
            Self::CourseNotFound => "Course not found".to_string(),
            Self::NotPurchasable { method } => format!(
                "This course is not available for purchase via {method} at the moment."
            ),
            Self::PaymentProviderError { .. } => {
                "Payment system error. Please try again later".to_string()
            }
            Self::ReconciliationFailed { reason } => reason.clone(),
            Self::EnrollmentNotFound => {
                "Enrollment not found for this user and course. Did you initialize the enrollment before redirect?"
                    .to_string()
            }
            _ => "Failed to enroll in course".to_string(),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EnrollmentError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
