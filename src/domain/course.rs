use crate::domain::money::Amount;
use serde::{Deserialize, Serialize};

/// Catalog entry, read-only from the checkout core's perspective.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Course {
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Current price in minor currency units, re-read on every initiation.
    pub price: Amount,
    /// Hosted provider's price reference; absent means the course cannot be
    /// purchased through the hosted-checkout path.
    pub stripe_price_id: Option<String>,
}
