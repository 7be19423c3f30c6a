use crate::domain::ports::{CheckoutProvider, CheckoutSession, SessionRequest};
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Hosted-checkout provider over the Stripe REST API.
///
/// Only the three calls this core needs: create customer, create checkout
/// session, retrieve checkout session. Requests are form-encoded per the
/// provider's wire format.
pub struct RestCheckoutProvider {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct CustomerBody {
    id: String,
}

#[derive(Deserialize)]
struct SessionBody {
    id: String,
    url: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl RestCheckoutProvider {
    pub fn new(api_base: String, secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            secret_key,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EnrollmentError::PaymentProviderError {
            message: format!("provider returned {status}: {body}"),
        })
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(provider_error)?;
        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(provider_error)
    }
}

fn provider_error(err: reqwest::Error) -> EnrollmentError {
    EnrollmentError::PaymentProviderError {
        message: err.to_string(),
    }
}

#[async_trait]
impl CheckoutProvider for RestCheckoutProvider {
    async fn create_customer(&self, email: &str, name: &str, user_id: &str) -> Result<String> {
        let body: CustomerBody = self
            .post_form(
                "/v1/customers",
                &[
                    ("email", email),
                    ("name", name),
                    ("metadata[userId]", user_id),
                ],
            )
            .await?;
        Ok(body.id)
    }

    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession> {
        let mut params: Vec<(&str, &str)> = vec![
            ("customer", &request.customer_id),
            ("line_items[0][price]", &request.price_id),
            ("line_items[0][quantity]", "1"),
            ("mode", "payment"),
            ("success_url", &request.success_url),
            ("cancel_url", &request.cancel_url),
        ];
        let metadata_params: Vec<(String, &str)> = request
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.as_str()))
            .collect();
        for (key, value) in &metadata_params {
            params.push((key.as_str(), value));
        }

        let body: SessionBody = self.post_form("/v1/checkout/sessions", &params).await?;
        Ok(CheckoutSession {
            id: body.id,
            url: body.url,
            metadata: body.metadata,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        let response = self
            .http
            .get(format!("{}/v1/checkout/sessions/{session_id}", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(provider_error)?;
        let body: SessionBody = Self::check(response)
            .await?
            .json()
            .await
            .map_err(provider_error)?;
        Ok(CheckoutSession {
            id: body.id,
            url: body.url,
            metadata: body.metadata,
        })
    }
}
