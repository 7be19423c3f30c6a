use crate::application::checkout::CheckoutService;
use crate::application::reconciliation::ReconciliationService;
use crate::config::Config;
use crate::domain::ports::{
    CheckoutProviderRef, CourseCatalogRef, EnrollmentStoreRef, RateLimiterRef, UserDirectoryRef,
};
use crate::gateway::hosted::HostedCheckoutGateway;
use crate::gateway::signed_form::SignedFormGateway;
use crate::gateway::{GatewayRegistry, PaymentMethod};
use std::sync::Arc;

/// Shared service wiring handed to every request handler. The config is
/// consumed during wiring; nothing re-reads it per request.
pub struct AppState {
    pub users: UserDirectoryRef,
    pub checkout: CheckoutService,
    pub reconciliation: ReconciliationService,
}

impl AppState {
    pub fn new(
        config: Config,
        enrollments: EnrollmentStoreRef,
        courses: CourseCatalogRef,
        users: UserDirectoryRef,
        provider: CheckoutProviderRef,
        rate_limiter: RateLimiterRef,
    ) -> Arc<Self> {
        let mut gateways = GatewayRegistry::new();
        gateways.register(
            PaymentMethod::Stripe,
            Arc::new(HostedCheckoutGateway::new(
                provider.clone(),
                users.clone(),
                config.base_url.clone(),
            )),
        );
        gateways.register(
            PaymentMethod::Esewa,
            Arc::new(SignedFormGateway::new(
                config.esewa.clone(),
                config.base_url.clone(),
            )),
        );

        let checkout =
            CheckoutService::new(courses, enrollments.clone(), rate_limiter, gateways);
        let reconciliation = ReconciliationService::new(enrollments, provider);

        Arc::new(Self {
            users,
            checkout,
            reconciliation,
        })
    }
}
