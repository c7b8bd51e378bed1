//! Page identifiers and navigation state

use serde::{Deserialize, Serialize};

/// The navigable pages of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKey {
    /// Landing page
    #[default]
    Home,
    /// Fleet electrification offering
    Solutions,
    /// Vehicle and financing models
    Models,
    /// Diesel-vs-electric savings calculator
    Calculator,
    /// Lead-capture contact form
    Contact,
}

/// Page-specific behavior a page needs mounted while it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorKind {
    /// Contact form validation and submission
    ContactForm,
    /// Savings calculator input handling
    SavingsCalculator,
}

impl CoordinatorKind {
    /// Human readable name, used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorKind::ContactForm => "contact form",
            CoordinatorKind::SavingsCalculator => "savings calculator",
        }
    }
}

impl PageKey {
    /// Every page, in navigation-menu order
    pub const ALL: [PageKey; 5] = [
        PageKey::Home,
        PageKey::Solutions,
        PageKey::Models,
        PageKey::Calculator,
        PageKey::Contact,
    ];

    /// Parse a page key, accepting an optional leading `#` and `/`
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();
        let key = key.strip_prefix('#').unwrap_or(key);
        let key = key.strip_prefix('/').unwrap_or(key);

        match key.to_ascii_lowercase().as_str() {
            "home" => Some(PageKey::Home),
            "solutions" => Some(PageKey::Solutions),
            "models" => Some(PageKey::Models),
            "calculator" => Some(PageKey::Calculator),
            "contact" => Some(PageKey::Contact),
            _ => None,
        }
    }

    /// Parse a page key, falling back to `Home` for anything unknown
    pub fn coerce(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKey::Home => "home",
            PageKey::Solutions => "solutions",
            PageKey::Models => "models",
            PageKey::Calculator => "calculator",
            PageKey::Contact => "contact",
        }
    }

    /// Address fragment for this page, e.g. `#contact`
    pub fn fragment(&self) -> String {
        format!("#{}", self.as_str())
    }

    /// Document title shown while the page is displayed
    pub fn title(&self) -> &'static str {
        match self {
            PageKey::Home => "Electric Fleets for Kenya",
            PageKey::Solutions => "Solutions",
            PageKey::Models => "Vehicles & Financing Models",
            PageKey::Calculator => "Savings Calculator",
            PageKey::Contact => "Talk to Our Fleet Team",
        }
    }

    /// The coordinator this page mounts, if any
    pub fn coordinator(&self) -> Option<CoordinatorKind> {
        match self {
            PageKey::Calculator => Some(CoordinatorKind::SavingsCalculator),
            PageKey::Contact => Some(CoordinatorKind::ContactForm),
            PageKey::Home | PageKey::Solutions | PageKey::Models => None,
        }
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Navigation state owned by the router
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Page currently displayed
    pub current_page: PageKey,
}
