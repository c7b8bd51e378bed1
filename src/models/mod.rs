//! Data models for fleetswitch
//!
//! This module contains the domain models used throughout the site: page
//! keys, the contact form and its submission, the savings calculator inputs
//! and results, and the validation logic they share.

pub mod calculator;
pub mod contact;
pub mod error;
pub mod page;
pub mod validation;

// Re-export commonly used types
pub use calculator::{
    calculate_savings, CalculationInputs, CalculationResult, CalculatorField, FinancingModel,
    RawCalculatorInputs,
};
pub use contact::{ClientMetadata, ContactField, ContactForm, FormSubmission};
pub use error::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use page::{CoordinatorKind, NavigationState, PageKey};
pub use validation::{sanitize, validate_email, validate_name, validate_phone};
