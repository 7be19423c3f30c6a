use crate::error::{EnrollmentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A strictly positive amount in integer minor currency units.
///
/// Wraps a `u64` to keep zero and negative amounts out of the enrollment
/// path at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(EnrollmentError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Converts into the secondary currency at a fixed exchange rate.
    ///
    /// The result is exact: both operands are integers, so no rounding
    /// happens before the caller formats it.
    pub fn converted(self, exchange_rate: u32) -> Decimal {
        Decimal::from(self.0) * Decimal::from(exchange_rate)
    }
}

impl TryFrom<u64> for Amount {
    type Error = EnrollmentError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(
            Amount::new(0),
            Err(EnrollmentError::Validation(_))
        ));
    }

    #[test]
    fn test_fixed_rate_conversion() {
        let amount = Amount::new(1000).unwrap();
        assert_eq!(amount.converted(140), dec!(140000));
        assert_eq!(format!("{:.2}", amount.converted(140)), "140000.00");
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<Amount>("0").is_err());
        let amount: Amount = serde_json::from_str("500").unwrap();
        assert_eq!(amount.value(), 500);
    }
}
