//! Validation functions for visitor input
//!
//! Pure checks for the contact form fields and the calculator's numeric
//! inputs, plus the HTML sanitizer applied before anything leaves the form.
//! None of these panic on malformed input.

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

use super::error::{ValidationError as ModelValidationError, ValidationErrorKind};

// Lazy static regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").expect("Invalid email regex pattern")
    })
}

/// Optional `+254`/`254` or trunk `0`, then a 9-digit subscriber number
/// starting with 1 or 7.
fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\+?254|0)?[17][0-9]{8}$").expect("Invalid phone regex pattern")
    })
}

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L} '\-]{2,50}$").expect("Invalid name regex pattern")
    })
}

/// Check an email address shape
pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Check a Kenyan mobile number, ignoring spaces, dashes and parentheses
pub fn validate_phone(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    phone_regex().is_match(&compact)
}

/// Check a person's name: 2-50 letters, spaces, hyphens or apostrophes
pub fn validate_name(name: &str) -> bool {
    name_regex().is_match(name.trim())
}

/// Trim and escape HTML-significant characters
pub fn sanitize(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

/// Email rule for the validator crate
pub fn email_rule(email: &str) -> Result<(), ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Phone rule for the validator crate
pub fn phone_rule(phone: &str) -> Result<(), ValidationError> {
    if validate_phone(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}

/// Name rule for the validator crate
pub fn name_rule(name: &str) -> Result<(), ValidationError> {
    if validate_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_name"))
    }
}

/// Validate a required field is not empty
pub fn validate_required(value: &str, field_name: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        Err(ModelValidationError::new(
            ValidationErrorKind::RequiredField,
            field_name,
        ))
    } else {
        Ok(())
    }
}

/// Validate string length constraints, counted in characters after trimming
pub fn validate_string_length(
    value: &str,
    field_name: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), ModelValidationError> {
    let len = value.trim().chars().count();

    if let Some(min_len) = min {
        if len < min_len {
            return Err(ModelValidationError::with_context(
                ValidationErrorKind::TooShort { min: min_len },
                field_name,
                format!("Value length {} is less than minimum {}", len, min_len),
            ));
        }
    }

    if let Some(max_len) = max {
        if len > max_len {
            return Err(ModelValidationError::with_context(
                ValidationErrorKind::TooLong { max: max_len },
                field_name,
                format!("Value length {} exceeds maximum {}", len, max_len),
            ));
        }
    }

    Ok(())
}

/// Parse a whole number typed by a visitor; thousands separators are allowed
pub fn parse_whole_number(raw: &str, field_name: &str) -> Result<i64, ModelValidationError> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();

    if compact.is_empty() {
        return Err(ModelValidationError::new(
            ValidationErrorKind::RequiredField,
            field_name,
        ));
    }

    compact.parse::<i64>().map_err(|e| {
        ModelValidationError::with_context(
            ValidationErrorKind::InvalidNumber,
            field_name,
            format!("Failed to parse '{}': {}", raw, e),
        )
    })
}

/// Validate that a number lies within an inclusive range
pub fn validate_range(
    value: i64,
    field_name: &str,
    min: i64,
    max: i64,
) -> Result<i64, ModelValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ModelValidationError::with_context(
            ValidationErrorKind::OutOfRange { min, max },
            field_name,
            format!("Value {} is outside [{}, {}]", value, min, max),
        ))
    }
}
