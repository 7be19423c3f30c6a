//! Application layer: the checkout orchestrator and the reconciliation
//! service. Both are stateless per request; all shared state lives behind
//! the domain ports.

pub mod checkout;
pub mod reconciliation;
