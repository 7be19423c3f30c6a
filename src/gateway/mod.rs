//! Payment gateway adapters: two interchangeable strategies behind
//! [`PaymentGateway`]. Adding a provider means adding a registry entry,
//! never a change to the orchestrator.

pub mod hosted;
pub mod signed_form;

use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Esewa,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stripe => f.write_str("stripe"),
            Self::Esewa => f.write_str("esewa"),
        }
    }
}

/// Parsed leniently at the API boundary so an unknown method becomes a
/// tagged error envelope rather than an extractor rejection.
impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "stripe" => Ok(Self::Stripe),
            "esewa" => Ok(Self::Esewa),
            _ => Err(UnknownPaymentMethod),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownPaymentMethod;

/// What the caller's browser should do next to complete payment.
#[derive(Debug, Clone, PartialEq)]
pub enum RedirectInstruction {
    /// Navigate to the provider-hosted checkout page.
    HostedCheckout { url: String },
    /// Render this auto-submitting form, which posts to the processor.
    AutoSubmitForm { html: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(
        &self,
        enrollment: &Enrollment,
        course: &Course,
        user: &User,
    ) -> Result<RedirectInstruction>;
}

#[derive(Default, Clone)]
pub struct GatewayRegistry {
    gateways: HashMap<PaymentMethod, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: PaymentMethod, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(method, gateway);
    }

    pub fn get(&self, method: PaymentMethod) -> Option<&Arc<dyn PaymentGateway>> {
        self.gateways.get(&method)
    }
}

/// Appends a query parameter with `?` or `&` depending on whether the URL
/// already carries a query. Matters for provider-side success URLs.
pub(crate) fn with_query(url: &str, key: &str, value: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{key}={value}")
}
