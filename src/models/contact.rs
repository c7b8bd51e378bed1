//! Contact form models
//!
//! The lead-capture form as typed by the visitor, and the sanitized
//! submission built from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::page::PageKey;
use super::validation::{
    email_rule, name_rule, phone_rule, sanitize, validate_email, validate_name, validate_phone,
    validate_required, validate_string_length,
};

/// Maximum length of the optional company field
pub const COMPANY_MAX_LEN: usize = 100;

/// Maximum length of the optional message field
pub const MESSAGE_MAX_LEN: usize = 1000;

/// Fields of the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Company,
    Message,
}

impl ContactField {
    /// Every field, in form order
    pub const ALL: [ContactField; 5] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Company,
        ContactField::Message,
    ];

    /// Field name as used in markup and in the submission body
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Company => "company",
            ContactField::Message => "message",
        }
    }

    /// Whether the visitor must fill this field in
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            ContactField::Name | ContactField::Email | ContactField::Phone
        )
    }
}

/// Contact form values as typed by the visitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactForm {
    /// Visitor's name
    #[validate(custom(function = "name_rule"))]
    pub name: String,

    /// Visitor's email address
    #[validate(custom(function = "email_rule"))]
    pub email: String,

    /// Kenyan mobile number
    #[validate(custom(function = "phone_rule"))]
    pub phone: String,

    /// Optional company name
    #[validate(length(max = 100))]
    pub company: Option<String>,

    /// Optional free-form message
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

impl ContactForm {
    /// Create a form with the required fields filled in
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            company: None,
            message: None,
        }
    }

    /// Set the company field
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the message field
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Raw value of a field; optional fields left empty yield `None`
    pub fn value(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::Name => Some(self.name.as_str()),
            ContactField::Email => Some(self.email.as_str()),
            ContactField::Phone => Some(self.phone.as_str()),
            ContactField::Company => self.company.as_deref(),
            ContactField::Message => self.message.as_deref(),
        }
        .filter(|v| field.is_required() || !v.trim().is_empty())
    }

    /// Validate a single field
    pub fn validate_field(&self, field: ContactField) -> Result<(), ValidationError> {
        let name = field.as_str();
        let value = match self.value(field) {
            Some(value) => value,
            None => return Ok(()),
        };

        if field.is_required() {
            validate_required(value, name)?;
        }

        match field {
            ContactField::Name if !validate_name(value) => {
                Err(ValidationError::new(ValidationErrorKind::InvalidName, name))
            },
            ContactField::Email if !validate_email(value) => {
                Err(ValidationError::new(ValidationErrorKind::InvalidEmail, name))
            },
            ContactField::Phone if !validate_phone(value) => {
                Err(ValidationError::new(ValidationErrorKind::InvalidPhone, name))
            },
            ContactField::Company => validate_string_length(value, name, None, Some(COMPANY_MAX_LEN)),
            ContactField::Message => validate_string_length(value, name, None, Some(MESSAGE_MAX_LEN)),
            _ => Ok(()),
        }
    }

    /// Validate every field, collecting one error per failing field
    pub fn validate_fields(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in ContactField::ALL {
            errors.check(self.validate_field(field));
        }
        errors.into_result(())
    }

    /// Sanitized values of every non-empty field, keyed by field name
    pub fn sanitized_fields(&self) -> BTreeMap<String, String> {
        ContactField::ALL
            .iter()
            .filter_map(|field| {
                self.value(*field)
                    .map(|value| (field.as_str().to_string(), sanitize(value)))
            })
            .collect()
    }
}

/// Where a submission came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// Analytics session of the visitor
    pub session_id: Uuid,
    /// Page the form was submitted from
    pub page: PageKey,
    /// Reported client user agent
    pub user_agent: String,
}

/// One submission attempt, as sent to the contact endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Sanitized field values
    pub fields: BTreeMap<String, String>,
    /// Session token proving the form came from this session
    pub csrf_token: String,
    /// When the visitor submitted
    pub timestamp: DateTime<Utc>,
    /// Origin details
    pub client_metadata: ClientMetadata,
}

impl FormSubmission {
    /// Build a submission from a validated form
    pub fn from_form(form: &ContactForm, csrf_token: &str, client_metadata: ClientMetadata) -> Self {
        Self {
            fields: form.sanitized_fields(),
            csrf_token: csrf_token.to_string(),
            timestamp: Utc::now(),
            client_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactForm {
        ContactForm::new("Amina Otieno", "amina@example.co.ke", "0712345678")
    }

    #[test]
    fn test_valid_form_passes_both_validators() {
        let form = valid_form()
            .with_company("Nairobi Logistics")
            .with_message("We run 12 diesel trucks.");
        assert!(form.validate_fields().is_ok());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_each_invalid_field_is_reported() {
        let form = ContactForm::new("A", "not-an-email", "12345")
            .with_company("x".repeat(COMPANY_MAX_LEN + 1));

        let errors = form.validate_fields().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("email"));
        assert!(errors.has_field("phone"));
        assert!(errors.has_field("company"));
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_empty_required_field_is_required_error() {
        let form = ContactForm::new("", "a@b.com", "0712345678");
        let errors = form.validate_fields().unwrap_err();
        assert_eq!(errors.errors()[0].kind, ValidationErrorKind::RequiredField);
    }

    #[test]
    fn test_blank_optional_fields_are_skipped() {
        let form = valid_form().with_company("   ").with_message("");
        assert!(form.validate_fields().is_ok());

        let fields = form.sanitized_fields();
        assert_eq!(fields.len(), 3);
        assert!(!fields.contains_key("company"));
    }

    #[test]
    fn test_sanitized_fields_escape_markup() {
        let form = valid_form().with_message("  <b>hello</b>  ");
        let fields = form.sanitized_fields();
        assert_eq!(fields["message"], "&lt;b&gt;hello&lt;&#x2F;b&gt;");
        assert_eq!(fields["name"], "Amina Otieno");
    }

    #[test]
    fn test_submission_serialization() {
        let metadata = ClientMetadata {
            session_id: Uuid::new_v4(),
            page: PageKey::Contact,
            user_agent: "test".to_string(),
        };
        let submission = FormSubmission::from_form(&valid_form(), "token-123", metadata);

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["csrf_token"], "token-123");
        assert_eq!(json["fields"]["phone"], "0712345678");
        assert_eq!(json["client_metadata"]["page"], "contact");
    }
}
