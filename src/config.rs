use crate::gateway::signed_form::SignedFormConfig;
use std::{env, fmt::Display, str::FromStr};
use tracing::info;

/// Environment-driven configuration with logged defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base application URL used to build success/failure URLs.
    pub base_url: String,
    pub esewa: SignedFormConfig,
    /// Enables the REST provider client; the simulated provider is used
    /// when unset.
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max_attempts: u32,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("BUILDEMY_PORT", "8080"),
            base_url: try_load("BUILDEMY_BASE_URL", "http://localhost:8080"),
            esewa: SignedFormConfig {
                // UAT credentials; production deployments override both.
                secret: try_load("ESEWA_SECRET", "8gBm/:&EnhH.1/q"),
                product_code: try_load("ESEWA_PRODUCT_CODE", "EPAYTEST"),
                form_url: try_load(
                    "ESEWA_FORM_URL",
                    "https://rc-epay.esewa.com.np/api/epay/main/v2/form",
                ),
                exchange_rate: try_load("ESEWA_EXCHANGE_RATE", "140"),
            },
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            stripe_api_base: try_load("STRIPE_API_BASE", "https://api.stripe.com"),
            rate_limit_window_secs: try_load("RATE_LIMIT_WINDOW_SECS", "60"),
            rate_limit_max_attempts: try_load("RATE_LIMIT_MAX_ATTEMPTS", "5"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("invalid {key} value: {e}"))
}
