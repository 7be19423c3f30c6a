use serde::{Deserialize, Serialize};

/// Identity record, read-only apart from the cached external customer id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Provider-side customer id, written back by the hosted adapter on
    /// first use so the customer is not recreated on every checkout.
    pub stripe_customer_id: Option<String>,
}
