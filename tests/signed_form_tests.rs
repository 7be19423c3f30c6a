mod common;

use buildemy_checkout::gateway::signed_form::sign;
use buildemy_checkout::gateway::{PaymentMethod, RedirectInstruction};
use common::{build_app, seed_basic};

fn field_value<'a>(html: &'a str, name: &str) -> &'a str {
    let marker = format!("name=\"{name}\" value=\"");
    let start = html.find(&marker).unwrap_or_else(|| panic!("field {name} missing")) + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    &html[start..end]
}

async fn esewa_form() -> String {
    let app = build_app(100);
    let user = seed_basic(&app).await;
    let instruction = app
        .state
        .checkout
        .begin_checkout(&user, "course-1", PaymentMethod::Esewa)
        .await
        .unwrap();
    match instruction {
        RedirectInstruction::AutoSubmitForm { html } => html,
        other => panic!("expected an auto-submit form, got {other:?}"),
    }
}

#[tokio::test]
async fn test_total_amount_uses_fixed_exchange_rate() {
    let html = esewa_form().await;
    // 1000 minor units at rate 140, two decimals.
    assert_eq!(field_value(&html, "total_amount"), "140000.00");
    assert_eq!(field_value(&html, "amount"), "140000.00");
    assert_eq!(field_value(&html, "tax_amount"), "0");
    assert_eq!(field_value(&html, "product_service_charge"), "0");
    assert_eq!(field_value(&html, "product_delivery_charge"), "0");
    assert_eq!(field_value(&html, "product_code"), "EPAYTEST");
}

#[tokio::test]
async fn test_transaction_uuid_is_fresh_per_attempt() {
    let first = esewa_form().await;
    let second = esewa_form().await;
    let uuid_a = field_value(&first, "transaction_uuid");
    let uuid_b = field_value(&second, "transaction_uuid");
    assert_ne!(uuid_a, uuid_b);
    assert!(uuid::Uuid::parse_str(uuid_a).is_ok());
}

#[tokio::test]
async fn test_signature_covers_the_canonical_string() {
    let html = esewa_form().await;
    let expected = sign(
        field_value(&html, "total_amount"),
        field_value(&html, "transaction_uuid"),
        field_value(&html, "product_code"),
        "8gBm/:&EnhH.1/q",
    );
    assert_eq!(field_value(&html, "signature"), expected);
    assert_eq!(
        field_value(&html, "signed_field_names"),
        "total_amount,transaction_uuid,product_code"
    );
}

#[tokio::test]
async fn test_field_order_matches_the_processor_contract() {
    let html = esewa_form().await;
    let expected_order = [
        "amount",
        "tax_amount",
        "total_amount",
        "transaction_uuid",
        "product_service_charge",
        "product_delivery_charge",
        "product_code",
        "success_url",
        "failure_url",
        "signed_field_names",
        "signature",
    ];
    let positions: Vec<usize> = expected_order
        .iter()
        .map(|name| {
            html.find(&format!("name=\"{name}\""))
                .unwrap_or_else(|| panic!("field {name} missing"))
        })
        .collect();
    assert!(
        positions.windows(2).all(|pair| pair[0] < pair[1]),
        "hidden fields out of order: {positions:?}"
    );
}

#[tokio::test]
async fn test_return_urls_embed_course_and_method() {
    let html = esewa_form().await;
    assert_eq!(
        field_value(&html, "success_url"),
        "http://localhost:8080/payment/success?method=esewa&courseId=course-1"
    );
    assert_eq!(
        field_value(&html, "failure_url"),
        "http://localhost:8080/payment/cancel?method=esewa"
    );
    assert!(html.contains("rc-epay.esewa.com.np"));
    assert!(html.contains("document.getElementById('esewa-payment-form').submit()"));
}
