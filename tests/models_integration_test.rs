//! Integration tests for fleetswitch data models
//!
//! These tests verify visitor input validation, the savings calculation and
//! the JSON shapes of submissions and analytics records.

use chrono::Utc;
use fleetswitch::analytics::{AnalyticsEvent, AnalyticsRecord, SubmissionOutcome};
use fleetswitch::models::{
    sanitize, validate_email, validate_name, validate_phone, ClientMetadata, RawCalculatorInputs,
};
use fleetswitch::{
    calculate_savings, CalculationInputs, CalculatorField, ContactForm, FinancingModel,
    FormSubmission, PageKey, ValidationErrorKind,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn test_email_shapes() {
    for valid in ["a@b.co", "amina.otieno@example.co.ke", "  x+tag@mail.io  "] {
        assert!(validate_email(valid), "{} should be accepted", valid);
    }
    for invalid in ["", "plain", "a@b", "a b@c.com", "@example.com", "a@b.c"] {
        assert!(!validate_email(invalid), "{} should be rejected", invalid);
    }
}

#[test]
fn test_kenyan_phone_numbers() {
    for valid in [
        "0712345678",
        "0112345678",
        "+254712345678",
        "254712345678",
        "712345678",
        "0712 345 678",
        "(0712)-345-678",
    ] {
        assert!(validate_phone(valid), "{} should be accepted", valid);
    }
    for invalid in ["", "0812345678", "071234567", "07123456789", "+1 555 0100", "phone"] {
        assert!(!validate_phone(invalid), "{} should be rejected", invalid);
    }
}

#[test]
fn test_names() {
    assert!(validate_name("Jo"));
    assert!(validate_name("Wanjiru O'Neil-Kamau"));
    assert!(validate_name("Zoë Müller"));
    assert!(!validate_name("J"));
    assert!(!validate_name("R2D2"));
    assert!(!validate_name(&"a".repeat(51)));
}

#[test]
fn test_sanitize_escapes_markup() {
    assert_eq!(
        sanitize("  <script>alert('x')</script> "),
        "&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt;"
    );
    assert_eq!(sanitize("Tom & \"Jerry\""), "Tom &amp; &quot;Jerry&quot;");
    assert_eq!(sanitize("plain text"), "plain text");
}

#[test]
fn test_contact_form_reports_all_bad_fields() {
    let form = ContactForm::new("", "nope", "12").with_message("x".repeat(1001));
    let errors = form.validate_fields().unwrap_err();

    assert!(errors.has_field("name"));
    assert!(errors.has_field("email"));
    assert!(errors.has_field("phone"));
    assert!(errors.has_field("message"));
    assert!(!errors.has_field("company"));
}

#[test]
fn test_submission_serialization() {
    let form = ContactForm::new("Amina Otieno", "amina@example.co.ke", "0712345678")
        .with_company("<b>Acme</b>");
    let session_id = Uuid::new_v4();
    let submission = FormSubmission::from_form(
        &form,
        "token-123",
        ClientMetadata {
            session_id,
            page: PageKey::Contact,
            user_agent: "fleetswitch-test".to_string(),
        },
    );

    let value = serde_json::to_value(&submission).expect("Should serialize");
    assert_eq!(
        value["fields"],
        json!({
            "company": "&lt;b&gt;Acme&lt;&#x2F;b&gt;",
            "email": "amina@example.co.ke",
            "name": "Amina Otieno",
            "phone": "0712345678"
        })
    );
    assert_eq!(value["csrf_token"], "token-123");
    assert_eq!(value["client_metadata"]["page"], "contact");
    assert_eq!(value["client_metadata"]["session_id"], session_id.to_string());
    assert!(value["timestamp"].is_string());

    let back: FormSubmission = serde_json::from_value(value).expect("Should deserialize");
    assert_eq!(back, submission);
}

#[test]
fn test_calculator_reference_cases() {
    let cases = [
        (250_000, 2_000, 1, FinancingModel::Exchange, 250_000, 120_000),
        (300_000, 3_000, 2, FinancingModel::Traditional, 600_000, 274_000),
        (200_000, 1_500, 4, FinancingModel::Lease, 800_000, 700_000),
    ];

    for (diesel, km, vehicles, model, current, new) in cases {
        let inputs = CalculationInputs::new(diesel, km, vehicles, model).unwrap();
        let result = calculate_savings(&inputs);

        assert_eq!(result.current_monthly_cost, current);
        assert_eq!(result.new_monthly_cost, new);
        assert_eq!(result.monthly_savings, current - new);
        assert_eq!(result.annual_savings, (current - new) * 12);
    }
}

#[test]
fn test_calculator_bounds_are_inclusive() {
    assert!(CalculationInputs::new(50_000, 100, 1, FinancingModel::Exchange).is_ok());
    assert!(CalculationInputs::new(1_000_000, 10_000, 50, FinancingModel::Exchange).is_ok());

    let errors = CalculationInputs::new(49_999, 10_001, 51, FinancingModel::Exchange).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors
        .errors()
        .iter()
        .all(|e| matches!(e.kind, ValidationErrorKind::OutOfRange { .. })));
}

#[test]
fn test_raw_inputs_parse_typed_values() {
    let mut raw = RawCalculatorInputs::default();
    raw.set(CalculatorField::DieselCost, "300,000");
    raw.set(CalculatorField::Model, "traditional");
    let inputs = CalculationInputs::from_raw(&raw).unwrap();
    assert_eq!(inputs.diesel_cost, 300_000);
    assert_eq!(inputs.model, FinancingModel::Traditional);

    raw.set(CalculatorField::VehicleCount, "two");
    raw.set(CalculatorField::Model, "hydrogen");
    let errors = CalculationInputs::from_raw(&raw).unwrap_err();
    assert!(errors.has_field("vehicle_count"));
    assert!(errors.has_field("model"));
}

#[test]
fn test_analytics_record_shape() {
    let session_id = Uuid::new_v4();
    let record = AnalyticsRecord {
        session_id,
        event: AnalyticsEvent::FormSubmission {
            form: "contact".to_string(),
            outcome: SubmissionOutcome::RateLimited,
            submission_id: None,
        },
        timestamp: Utc::now(),
    };

    let mut value = serde_json::to_value(&record).expect("Should serialize");
    assert!(value["timestamp"].is_string());
    value.as_object_mut().unwrap().remove("timestamp");

    assert_eq!(
        value,
        json!({
            "session_id": session_id.to_string(),
            "type": "form_submission",
            "form": "contact",
            "outcome": "rate_limited",
            "submission_id": null
        })
    );
}
