#![allow(dead_code)]

use buildemy_checkout::config::Config;
use buildemy_checkout::domain::course::Course;
use buildemy_checkout::domain::money::Amount;
use buildemy_checkout::domain::user::User;
use buildemy_checkout::gateway::signed_form::SignedFormConfig;
use buildemy_checkout::infrastructure::in_memory::{
    FixedWindowRateLimiter, InMemoryCourseCatalog, InMemoryEnrollmentStore, InMemoryUserDirectory,
    SimulatedCheckoutProvider,
};
use buildemy_checkout::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "http://localhost:8080";

/// Fully wired in-memory application with handles on the concrete ports so
/// tests can seed and inspect state directly.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub enrollments: InMemoryEnrollmentStore,
    pub courses: InMemoryCourseCatalog,
    pub users: InMemoryUserDirectory,
    pub provider: SimulatedCheckoutProvider,
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        base_url: BASE_URL.to_string(),
        esewa: SignedFormConfig {
            secret: "8gBm/:&EnhH.1/q".to_string(),
            product_code: "EPAYTEST".to_string(),
            form_url: "https://rc-epay.esewa.com.np/api/epay/main/v2/form".to_string(),
            exchange_rate: 140,
        },
        stripe_secret_key: None,
        stripe_api_base: "https://api.stripe.com".to_string(),
        rate_limit_window_secs: 60,
        rate_limit_max_attempts: 100,
    }
}

pub fn build_app(max_attempts: u32) -> TestApp {
    let enrollments = InMemoryEnrollmentStore::new();
    let courses = InMemoryCourseCatalog::new();
    let users = InMemoryUserDirectory::new();
    let provider = SimulatedCheckoutProvider::new();

    let state = AppState::new(
        test_config(),
        Arc::new(enrollments.clone()),
        Arc::new(courses.clone()),
        Arc::new(users.clone()),
        Arc::new(provider.clone()),
        Arc::new(FixedWindowRateLimiter::new(
            Duration::from_secs(60),
            max_attempts,
        )),
    );

    TestApp {
        state,
        enrollments,
        courses,
        users,
        provider,
    }
}

pub fn sample_course(id: &str, price: u64) -> Course {
    Course {
        id: id.to_string(),
        slug: format!("{id}-slug"),
        title: format!("Course {id}"),
        price: Amount::new(price).unwrap(),
        stripe_price_id: Some(format!("price_{id}")),
    }
}

pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: format!("User {id}"),
        stripe_customer_id: None,
    }
}

pub fn token_for(id: &str) -> String {
    format!("tok-{id}")
}

/// Seeds one course and one user and returns the user.
pub async fn seed_basic(app: &TestApp) -> User {
    app.courses.insert(sample_course("course-1", 1000)).await;
    let user = sample_user("user-1");
    app.users.insert(user.clone(), &token_for("user-1")).await;
    user
}
