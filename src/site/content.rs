//! Page content generation

use crate::error::Result;
use crate::models::{CalculatorField, ContactField, FinancingModel, PageKey};

/// Markup for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Page the markup belongs to
    pub page: PageKey,
    /// Document title
    pub title: String,
    /// Main content region markup
    pub markup: String,
}

impl PageContent {
    /// Minimal home page used when no provider output can be shown
    pub fn fallback() -> Self {
        Self {
            page: PageKey::Home,
            title: PageKey::Home.title().to_string(),
            markup: r#"<section class="hero"><h1>Electric Fleets for Kenya</h1><p>Please refresh the page.</p></section>"#
                .to_string(),
        }
    }
}

/// Produces page content; owns no state
pub trait PageContentProvider: Send + Sync {
    /// Markup for `page`
    fn render(&self, page: PageKey) -> Result<PageContent>;
}

/// Built-in markup for every page
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContentProvider;

impl StaticContentProvider {
    pub fn new() -> Self {
        Self
    }
}

impl PageContentProvider for StaticContentProvider {
    fn render(&self, page: PageKey) -> Result<PageContent> {
        let markup = match page {
            PageKey::Home => home_markup(),
            PageKey::Solutions => solutions_markup(),
            PageKey::Models => models_markup(),
            PageKey::Calculator => calculator_markup(),
            PageKey::Contact => contact_markup(),
        };

        Ok(PageContent {
            page,
            title: page.title().to_string(),
            markup,
        })
    }
}

fn home_markup() -> String {
    concat!(
        r#"<section class="hero">"#,
        r#"<h1>Electric Fleets for Kenya</h1>"#,
        r#"<p>Cut fuel and maintenance costs by switching your delivery fleet to electric.</p>"#,
        r##"<a href="#calculator" class="btn btn-primary">Calculate your savings</a>"##,
        r##"<a href="#contact" class="btn btn-secondary">Talk to us</a>"##,
        r#"</section>"#,
    )
    .to_string()
}

fn solutions_markup() -> String {
    concat!(
        r#"<section class="solutions">"#,
        r#"<h2>Solutions</h2>"#,
        r#"<article><h3>Battery swapping</h3><p>Swap a depleted battery for a charged one in under two minutes.</p></article>"#,
        r#"<article><h3>Fleet telematics</h3><p>Live location, range and utilisation for every vehicle.</p></article>"#,
        r#"<article><h3>Driver training</h3><p>Onboarding and efficient-driving coaching for your team.</p></article>"#,
        r#"</section>"#,
    )
    .to_string()
}

fn models_markup() -> String {
    let cards: String = [
        (FinancingModel::Exchange, "Battery exchange", "Subscription with unlimited swaps."),
        (FinancingModel::Traditional, "Own and charge", "Finance the vehicle, pay per km charged."),
        (FinancingModel::Lease, "Full-service lease", "Vehicle, energy and maintenance in one fee."),
    ]
    .iter()
    .map(|(model, name, blurb)| {
        format!(
            r#"<article class="model-card" data-model="{}"><h3>{}</h3><p>{}</p></article>"#,
            model, name, blurb
        )
    })
    .collect();

    format!(
        r#"<section class="models"><h2>Vehicles &amp; Financing Models</h2>{}</section>"#,
        cards
    )
}

fn calculator_markup() -> String {
    let inputs: String = CalculatorField::ALL
        .iter()
        .map(|field| match field {
            CalculatorField::Model => format!(
                r#"<label>{name}<select name="{name}"><option>exchange</option><option>traditional</option><option>lease</option></select></label>"#,
                name = field.as_str()
            ),
            _ => format!(
                r#"<label>{name}<input type="number" name="{name}"><span class="field-error" data-for="{name}"></span></label>"#,
                name = field.as_str()
            ),
        })
        .collect();

    format!(
        r#"<section class="calculator"><h2>Savings Calculator</h2><form id="calculator-form">{}</form><div id="calculator-result"></div></section>"#,
        inputs
    )
}

fn contact_markup() -> String {
    let inputs: String = ContactField::ALL
        .iter()
        .map(|field| {
            let required = if field.is_required() { " required" } else { "" };
            let control = match field {
                ContactField::Message => {
                    format!(r#"<textarea name="{}"{}></textarea>"#, field.as_str(), required)
                },
                _ => format!(r#"<input name="{}"{}>"#, field.as_str(), required),
            };
            format!(
                r#"<label>{name}{control}<span class="field-error" data-for="{name}"></span></label>"#,
                name = field.as_str(),
                control = control
            )
        })
        .collect();

    format!(
        r#"<section class="contact"><h2>Talk to Our Fleet Team</h2><form id="contact-form">{}<button type="submit">Send</button></form></section>"#,
        inputs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_renders() {
        let provider = StaticContentProvider::new();
        for page in PageKey::ALL {
            let content = provider.render(page).unwrap();
            assert_eq!(content.page, page);
            assert_eq!(content.title, page.title());
            assert!(!content.markup.is_empty());
        }
    }

    #[test]
    fn test_form_pages_contain_their_fields() {
        let provider = StaticContentProvider::new();

        let contact = provider.render(PageKey::Contact).unwrap();
        for field in ContactField::ALL {
            assert!(contact.markup.contains(&format!(r#"name="{}""#, field.as_str())));
        }

        let calculator = provider.render(PageKey::Calculator).unwrap();
        for field in CalculatorField::ALL {
            assert!(calculator.markup.contains(&format!(r#"name="{}""#, field.as_str())));
        }
    }

    #[test]
    fn test_fallback_is_home() {
        assert_eq!(PageContent::fallback().page, PageKey::Home);
    }
}
