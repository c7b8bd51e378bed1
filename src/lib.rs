//! fleetswitch Library
//!
//! Behavior layer of the fleetswitch marketing site: page routing, the
//! contact form and the fleet savings calculator, with the validation,
//! rate limiting and analytics they rely on.

pub mod analytics;
pub mod config;
pub mod coordinators;
pub mod error;
pub mod logging;
pub mod models;
pub mod security;
pub mod site;
pub mod submission;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};

// Re-export model types
pub use models::{
    calculate_savings, CalculationInputs, CalculationResult, CalculatorField, ContactField,
    ContactForm, FinancingModel, FormSubmission, PageKey, ValidationError, ValidationErrorKind,
    ValidationErrors,
};

// Re-export site wiring
pub use security::{RateLimiter, TokenStore};
pub use site::{
    Notification, NotificationLevel, PageContent, PageContentProvider, RenderSurface, Router,
    Site, SiteComponents, StaticContentProvider, SubmitState, TerminalSurface,
};
