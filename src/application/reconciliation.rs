use crate::domain::enrollment::Enrollment;
use crate::domain::ports::{CheckoutProviderRef, EnrollmentStoreRef};
use crate::error::{EnrollmentError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, info};

/// Query parameters of the provider return redirect. Anything else the
/// provider appends (such as `method=`) is ignored.
#[derive(Debug, Deserialize, Default)]
pub struct ReturnParams {
    #[serde(rename = "courseId")]
    pub course_id: Option<String>,
    pub session_id: Option<String>,
    /// Legacy opaque payload some processors append; best-effort only.
    pub data: Option<String>,
}

/// Outcome of a confirmed reconciliation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Confirmation {
    Activated,
    AlreadyActive,
}

impl Confirmation {
    pub fn message(self) -> &'static str {
        match self {
            Self::Activated => "Your enrollment is now active. Enjoy your course!",
            Self::AlreadyActive => "Your enrollment is already active.",
        }
    }
}

/// Consumes the provider's success redirect and activates the matching
/// enrollment exactly once. Safe to invoke repeatedly and concurrently:
/// activation is idempotent at the store level.
pub struct ReconciliationService {
    enrollments: EnrollmentStoreRef,
    provider: CheckoutProviderRef,
}

impl ReconciliationService {
    pub fn new(enrollments: EnrollmentStoreRef, provider: CheckoutProviderRef) -> Self {
        Self {
            enrollments,
            provider,
        }
    }

    /// Resolves the course id from the return parameters, in order: the
    /// `courseId` parameter (sanitized), provider session metadata via
    /// `session_id`, then the legacy Base64 `data` payload. Touches no
    /// local state.
    pub async fn resolve_course_id(&self, params: &ReturnParams) -> Option<String> {
        if let Some(raw) = &params.course_id
            && let Some(course_id) = sanitize(raw)
        {
            return Some(course_id);
        }

        if let Some(session_id) = &params.session_id {
            match self.provider.retrieve_session(session_id).await {
                Ok(session) => {
                    if let Some(course_id) = session.metadata.get("courseId") {
                        return Some(course_id.clone());
                    }
                }
                Err(err) => debug!("session lookup failed during reconciliation: {err}"),
            }
        }

        if let Some(data) = &params.data
            && let Some(course_id) = decode_legacy_course_id(data)
        {
            return Some(course_id);
        }

        None
    }

    /// Activates the caller's enrollment for the course. Already-`Active`
    /// rows report success with no write, so provider retries and page
    /// refreshes never error or double-count.
    pub async fn confirm(&self, user_id: &str, course_id: &str) -> Result<Confirmation> {
        let enrollment = self
            .enrollments
            .find(user_id, course_id)
            .await?
            .ok_or(EnrollmentError::EnrollmentNotFound)?;

        if enrollment.is_active() {
            return Ok(Confirmation::AlreadyActive);
        }

        let activated: Enrollment = self.enrollments.activate(enrollment.id).await?;
        info!(
            user_id,
            course_id,
            enrollment_id = %activated.id,
            "enrollment activated"
        );
        Ok(Confirmation::Activated)
    }
}

/// Truncates the raw value at the first `?` or `&`; misassembled success
/// URLs sometimes glue a second query string onto the parameter.
fn sanitize(raw: &str) -> Option<String> {
    let first = raw.split(['?', '&']).next().unwrap_or("");
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Legacy fallback: `data` is standard Base64 of a JSON object that may
/// carry a `courseId` member. Any decode failure is silently ignored.
fn decode_legacy_course_id(data: &str) -> Option<String> {
    let bytes = STANDARD.decode(data).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("courseId")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_glued_queries() {
        assert_eq!(sanitize("abc"), Some("abc".to_string()));
        assert_eq!(sanitize("abc?session_id=cs_1"), Some("abc".to_string()));
        assert_eq!(sanitize("abc&method=esewa"), Some("abc".to_string()));
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("?x=1"), None);
    }

    #[test]
    fn test_legacy_data_decode() {
        let payload = STANDARD.encode(r#"{"courseId":"course-9","txn":"ok"}"#);
        assert_eq!(
            decode_legacy_course_id(&payload),
            Some("course-9".to_string())
        );
        assert_eq!(decode_legacy_course_id("not-base64!"), None);
        assert_eq!(decode_legacy_course_id(&STANDARD.encode("[1,2]")), None);
    }
}
