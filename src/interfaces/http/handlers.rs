use crate::application::reconciliation::ReturnParams;
use crate::domain::user::User;
use crate::error::{EnrollmentError, Result};
use crate::gateway::{PaymentMethod, RedirectInstruction};
use crate::interfaces::http::pages;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    #[serde(rename = "courseId")]
    pub course_id: String,
    /// Kept as a string so an unknown method reaches the handler and gets
    /// the tagged error envelope instead of an extractor rejection.
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
}

/// Tagged success envelope; exactly one of `checkoutUrl` / `html` is set.
#[derive(Debug, Serialize)]
struct SuccessBody {
    status: &'static str,
    #[serde(rename = "checkoutUrl", skip_serializing_if = "Option::is_none")]
    checkout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for EnrollmentError {
    fn into_response(self) -> Response {
        let status = match &self {
            EnrollmentError::AuthRequired => StatusCode::UNAUTHORIZED,
            EnrollmentError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            EnrollmentError::AlreadyEnrolled => StatusCode::CONFLICT,
            EnrollmentError::CourseNotFound | EnrollmentError::EnrollmentNotFound => {
                StatusCode::NOT_FOUND
            }
            EnrollmentError::NotPurchasable { .. }
            | EnrollmentError::ReconciliationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EnrollmentError::PaymentProviderError { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            status: "error",
            message: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn enroll(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<EnrollRequest>,
) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    let Ok(method) = request.payment_method.parse::<PaymentMethod>() else {
        let body = ErrorBody {
            status: "error",
            message: "Invalid payment method".to_string(),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    };

    match state
        .checkout
        .begin_checkout(&user, &request.course_id, method)
        .await
    {
        Ok(RedirectInstruction::HostedCheckout { url }) => Json(SuccessBody {
            status: "success",
            checkout_url: Some(url),
            html: None,
        })
        .into_response(),
        Ok(RedirectInstruction::AutoSubmitForm { html }) => Json(SuccessBody {
            status: "success",
            checkout_url: None,
            html: Some(html),
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Provider return redirect: resolves the course, requires a session and
/// idempotently activates the enrollment. Always renders a page.
pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ReturnParams>,
) -> Html<String> {
    let Some(course_id) = state.reconciliation.resolve_course_id(&params).await else {
        let err = EnrollmentError::ReconciliationFailed {
            reason: "We could not activate your enrollment. Make sure the link includes a valid courseId."
                .to_string(),
        };
        return pages::confirmation(false, &err.user_message());
    };

    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(err) => return pages::confirmation(false, &err.user_message()),
    };

    match state.reconciliation.confirm(&user.id, &course_id).await {
        Ok(confirmation) => pages::confirmation(true, confirmation.message()),
        Err(err) => pages::confirmation(false, &err.user_message()),
    }
}

pub async fn payment_cancel() -> Html<String> {
    pages::cancelled()
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let token = bearer_token(headers)
        .or_else(|| cookie_token(headers))
        .ok_or(EnrollmentError::AuthRequired)?;
    state
        .users
        .find_by_token(&token)
        .await?
        .ok_or(EnrollmentError::AuthRequired)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// The provider redirect is a plain browser navigation, so the session
/// arrives as a cookie rather than an Authorization header.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| cookie.trim().strip_prefix("session="))
        .map(str::to_string)
}
