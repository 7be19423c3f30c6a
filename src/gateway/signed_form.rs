use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::user::User;
use crate::error::Result;
use crate::gateway::{PaymentGateway, RedirectInstruction, with_query};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Configuration for the signed-form wallet processor.
#[derive(Debug, Clone)]
pub struct SignedFormConfig {
    /// Shared HMAC secret agreed with the processor.
    pub secret: String,
    pub product_code: String,
    /// Processor endpoint the form posts to.
    pub form_url: String,
    /// Fixed minor-unit to wallet-currency exchange rate.
    pub exchange_rate: u32,
}

/// Signed-form adapter (eSewa-shaped).
///
/// Produces an auto-submitting POST form carrying an HMAC-SHA-256 signature
/// over `total_amount`, `transaction_uuid` and `product_code`. Field set,
/// order and canonicalization are a wire contract with the processor and
/// must not drift.
pub struct SignedFormGateway {
    config: SignedFormConfig,
    base_url: String,
}

impl SignedFormGateway {
    pub fn new(config: SignedFormConfig, base_url: String) -> Self {
        Self { config, base_url }
    }
}

/// Signs the canonical string
/// `total_amount=<amt>,transaction_uuid=<uuid>,product_code=<code>` with
/// HMAC-SHA-256 and encodes the digest as standard padded Base64.
pub fn sign(
    total_amount: &str,
    transaction_uuid: &str,
    product_code: &str,
    secret: &str,
) -> String {
    let message = format!(
        "total_amount={total_amount},transaction_uuid={transaction_uuid},product_code={product_code}"
    );
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

#[async_trait]
impl PaymentGateway for SignedFormGateway {
    async fn initiate(
        &self,
        _enrollment: &Enrollment,
        course: &Course,
        _user: &User,
    ) -> Result<RedirectInstruction> {
        let total_amount = format!("{:.2}", course.price.converted(self.config.exchange_rate));
        let transaction_uuid = Uuid::new_v4().to_string();
        let signature = sign(
            &total_amount,
            &transaction_uuid,
            &self.config.product_code,
            &self.config.secret,
        );

        let success_url = with_query(
            &with_query(
                &format!("{}/payment/success", self.base_url),
                "method",
                "esewa",
            ),
            "courseId",
            &course.id,
        );
        let failure_url = with_query(
            &format!("{}/payment/cancel", self.base_url),
            "method",
            "esewa",
        );

        // The processor validates field presence and order; keep this layout
        // in sync with the signed_field_names list.
        let html = format!(
            r#"<form id="esewa-payment-form" action="{form_url}" method="POST">
  <input type="hidden" name="amount" value="{total_amount}" />
  <input type="hidden" name="tax_amount" value="0" />
  <input type="hidden" name="total_amount" value="{total_amount}" />
  <input type="hidden" name="transaction_uuid" value="{transaction_uuid}" />
  <input type="hidden" name="product_service_charge" value="0" />
  <input type="hidden" name="product_delivery_charge" value="0" />
  <input type="hidden" name="product_code" value="{product_code}" />
  <input type="hidden" name="success_url" value="{success_url}" />
  <input type="hidden" name="failure_url" value="{failure_url}" />
  <input type="hidden" name="signed_field_names" value="total_amount,transaction_uuid,product_code" />
  <input type="hidden" name="signature" value="{signature}" />
</form>
<script>document.getElementById('esewa-payment-form').submit();</script>"#,
            form_url = self.config.form_url,
            product_code = self.config.product_code,
        );

        Ok(RedirectInstruction::AutoSubmitForm { html })
    }
}
