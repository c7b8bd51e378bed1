//! Render surface capability
//!
//! Everything the site does to the visible page goes through
//! [`RenderSurface`], so the router and coordinators run headless in tests and
//! in the terminal binary alike.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::models::{CalculationResult, CoordinatorKind, PageKey};

use super::content::PageContent;

/// Severity of a notification banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

/// A transient banner shown to the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// State of the contact form's submit control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Ready,
    Loading,
}

/// What the site may do to the visible page.
///
/// Implementations use interior mutability; every method takes `&self` so one
/// surface can be shared by the router and an in-flight submission.
pub trait RenderSurface: Send + Sync {
    /// Replace the main content region
    fn set_content(&self, content: &PageContent) -> Result<()>;

    /// Mark `page`'s navigation item current and every other one not current
    fn set_active_nav_item(&self, page: PageKey);

    /// Show a banner
    fn show_notification(&self, notification: Notification);

    /// Show an inline error next to a form field
    fn set_field_error(&self, field: &str, message: &str);

    /// Remove every inline field error
    fn clear_field_errors(&self);

    /// Switch the submit control between ready and loading
    fn set_submit_state(&self, state: SubmitState);

    /// Show a savings breakdown, or clear it when `None`
    fn show_calculation(&self, result: Option<&CalculationResult>);

    /// Current address fragment, including the leading `#` if any
    fn fragment(&self) -> String;

    /// Replace the address fragment
    fn set_fragment(&self, fragment: &str);

    /// Page behavior was bound to the displayed controls
    fn attach_coordinator(&self, _kind: CoordinatorKind) {}

    /// Page behavior was released; its controls no longer respond
    fn detach_coordinator(&self, _kind: CoordinatorKind) {}
}

/// Render surface writing to standard output, for the terminal binary
#[derive(Debug, Default)]
pub struct TerminalSurface {
    fragment: Mutex<String>,
}

impl TerminalSurface {
    /// Create a surface starting at `fragment`
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: Mutex::new(fragment.into()),
        }
    }

    fn print(&self, line: std::fmt::Arguments<'_>) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_fmt(line)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl RenderSurface for TerminalSurface {
    fn set_content(&self, content: &PageContent) -> Result<()> {
        self.print(format_args!("\n=== {} ===\n{}", content.title, content.markup))
            .map_err(|e| Error::render(format!("Failed to write page content: {}", e)))
    }

    fn set_active_nav_item(&self, page: PageKey) {
        let items: Vec<String> = PageKey::ALL
            .iter()
            .map(|p| {
                if *p == page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        let _ = self.print(format_args!("nav: {}", items.join(" | ")));
    }

    fn show_notification(&self, notification: Notification) {
        let _ = self.print(format_args!(
            "({}) {}",
            notification.level.as_str(),
            notification.message
        ));
    }

    fn set_field_error(&self, field: &str, message: &str) {
        let _ = self.print(format_args!("  ! {}: {}", field, message));
    }

    fn clear_field_errors(&self) {}

    fn set_submit_state(&self, state: SubmitState) {
        if state == SubmitState::Loading {
            let _ = self.print(format_args!("  sending..."));
        }
    }

    fn show_calculation(&self, result: Option<&CalculationResult>) {
        if let Some(r) = result {
            let _ = self.print(format_args!(
                "  current KES {} / month, electric KES {} / month\n  savings KES {} / month ({:.1}%), KES {} / year",
                r.current_monthly_cost,
                r.new_monthly_cost,
                r.monthly_savings,
                r.savings_percent,
                r.annual_savings
            ));
        }
    }

    fn fragment(&self) -> String {
        self.fragment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_fragment(&self, fragment: &str) {
        *self.fragment.lock().unwrap_or_else(PoisonError::into_inner) = fragment.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_constructors() {
        assert_eq!(
            Notification::success("ok").level,
            NotificationLevel::Success
        );
        assert_eq!(Notification::error("no").message, "no");
        assert_eq!(NotificationLevel::Warning.as_str(), "warning");
    }

    #[test]
    fn test_terminal_surface_fragment() {
        let surface = TerminalSurface::new("#models");
        assert_eq!(surface.fragment(), "#models");
        surface.set_fragment("#contact");
        assert_eq!(surface.fragment(), "#contact");
    }
}
