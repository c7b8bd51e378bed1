//! Hash-fragment page router
//!
//! The router owns the navigation state. Every navigation unmounts the current
//! coordinator, renders the target page, mounts the target's coordinator and
//! updates the navigation menu as one step; when content for the target
//! cannot be shown, the home page is shown instead, so the displayed content
//! and the mounted coordinator always belong to the same page.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::content::{PageContent, PageContentProvider};
use crate::coordinators::{
    CoordinatorContext, MountEpoch, PageCoordinator, PendingSubmission,
};
use crate::error::{Error, Result};
use crate::models::{
    CalculationResult, CalculatorField, ContactForm, CoordinatorKind, NavigationState, PageKey,
};
use crate::navigation_span;
use crate::submission::SubmissionReceipt;

/// Routes navigation events to page content and page coordinators
pub struct Router {
    state: NavigationState,
    content: Arc<dyn PageContentProvider>,
    ctx: CoordinatorContext,
    epoch: MountEpoch,
    mounted: Option<PageCoordinator>,
}

impl Router {
    /// Create a router on `home`; nothing is rendered until the first event
    pub fn new(content: Arc<dyn PageContentProvider>, ctx: CoordinatorContext) -> Self {
        Self {
            state: NavigationState::default(),
            content,
            ctx,
            epoch: MountEpoch::new(),
            mounted: None,
        }
    }

    /// Page currently displayed
    pub fn current_page(&self) -> PageKey {
        self.state.current_page
    }

    /// Kind of the mounted coordinator, if any
    pub fn active_coordinator(&self) -> Option<CoordinatorKind> {
        self.mounted.as_ref().map(PageCoordinator::kind)
    }

    /// Navigate to `requested`; unknown keys show `home`.
    ///
    /// Returns the page actually displayed.
    pub fn navigate_to(&mut self, requested: &str) -> PageKey {
        let span = navigation_span!(requested);
        let _entered = span.enter();

        let target = PageKey::coerce(requested);
        if PageKey::parse(requested).is_none() {
            debug!(requested, "Unknown page requested, showing home");
        }

        if let Some(previous) = self.mounted.take() {
            let kind = previous.kind();
            previous.deactivate();
            self.epoch.unmount();
            debug!(coordinator = kind.as_str(), "Coordinator unmounted");
        }

        let page = match self.replace_content(target) {
            Ok(()) => target,
            Err(err) => {
                error!(
                    page = %target,
                    error = %err,
                    error_type = err.error_type(),
                    "Failed to render page, falling back to home"
                );
                span.record("fallback", true);
                self.render_home();
                PageKey::Home
            },
        };
        span.record("page", page.as_str());

        self.state.current_page = page;
        self.ctx.surface.set_fragment(&page.fragment());

        self.mounted = page.coordinator().map(|kind| {
            debug!(coordinator = kind.as_str(), "Coordinator mounted");
            PageCoordinator::mount(kind, self.ctx.clone(), self.epoch.mount())
        });

        self.ctx.surface.set_active_nav_item(page);
        self.ctx.analytics.page_view(page);
        info!(page = %page, "Page displayed");

        page
    }

    /// Follow the address fragment (initial load or fragment change)
    pub fn handle_external_route_change(&mut self) -> PageKey {
        let fragment = self.ctx.surface.fragment();
        match fragment.trim() {
            "" | "#" => self.navigate_to(PageKey::Home.as_str()),
            key => self.navigate_to(key),
        }
    }

    /// Follow an in-page navigation link
    pub fn handle_link_click(&mut self, target: &str) -> PageKey {
        self.ctx
            .analytics
            .click("nav_link", PageKey::parse(target));
        self.navigate_to(target)
    }

    /// Start a contact submission on the mounted contact form.
    ///
    /// The returned submission does not borrow the router, so navigation can
    /// continue while it is in flight.
    pub fn begin_contact_submission(&self, form: &ContactForm) -> Result<PendingSubmission> {
        match &self.mounted {
            Some(PageCoordinator::Contact(coordinator)) => coordinator.prepare(form),
            _ => Err(Error::NotMounted(CoordinatorKind::ContactForm.as_str())),
        }
    }

    /// Submit the contact form and wait for the outcome
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<SubmissionReceipt> {
        self.begin_contact_submission(form)?.send().await
    }

    /// Pass a calculator field change to the mounted calculator
    pub fn calculator_input(&self, field: CalculatorField, value: &str) -> Result<()> {
        match &self.mounted {
            Some(PageCoordinator::Calculator(calculator)) => {
                calculator.input(field, value);
                Ok(())
            },
            _ => Err(Error::NotMounted(CoordinatorKind::SavingsCalculator.as_str())),
        }
    }

    /// Recompute the calculator result immediately
    pub fn recalculate(&self) -> Result<Option<CalculationResult>> {
        match &self.mounted {
            Some(PageCoordinator::Calculator(calculator)) => Ok(calculator.recalculate()),
            _ => Err(Error::NotMounted(CoordinatorKind::SavingsCalculator.as_str())),
        }
    }

    fn replace_content(&self, page: PageKey) -> Result<()> {
        let content = self.content.render(page)?;
        if content.page != page {
            return Err(Error::content(format!(
                "Provider returned {} content for {}",
                content.page, page
            )));
        }
        self.ctx.surface.set_content(&content)
    }

    fn render_home(&self) {
        if let Err(err) = self.replace_content(PageKey::Home) {
            error!(
                error = %err,
                error_type = err.error_type(),
                "Failed to render home, showing built-in fallback"
            );
            if let Err(err) = self.ctx.surface.set_content(&PageContent::fallback()) {
                error!(error = %err, "Failed to show fallback content");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{Notification, RenderSurface, StaticContentProvider, SubmitState};
    use crate::test_utils::{
        test_context, valid_contact_form, FailingContentProvider, RecordingSurface, SurfaceEvent,
    };
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Recording surface that can hold one `clear_field_errors` call until
    /// released from another thread
    struct GatedSurface {
        inner: Arc<RecordingSurface>,
        gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    }

    impl GatedSurface {
        fn new(inner: Arc<RecordingSurface>) -> Self {
            Self {
                inner,
                gate: Mutex::new(None),
            }
        }

        /// Returns a receiver signalled once the call is held, and a sender
        /// that lets it continue
        fn hold_next_clear(&self) -> (Receiver<()>, Sender<()>) {
            let (entered_tx, entered_rx) = channel();
            let (release_tx, release_rx) = channel();
            *self.gate.lock().unwrap() = Some((entered_tx, release_rx));
            (entered_rx, release_tx)
        }
    }

    impl RenderSurface for GatedSurface {
        fn set_content(&self, content: &PageContent) -> Result<()> {
            self.inner.set_content(content)
        }

        fn set_active_nav_item(&self, page: PageKey) {
            self.inner.set_active_nav_item(page)
        }

        fn show_notification(&self, notification: Notification) {
            self.inner.show_notification(notification)
        }

        fn set_field_error(&self, field: &str, message: &str) {
            self.inner.set_field_error(field, message)
        }

        fn clear_field_errors(&self) {
            let gate = self.gate.lock().unwrap().take();
            if let Some((entered, release)) = gate {
                let _ = entered.send(());
                let _ = release.recv_timeout(Duration::from_secs(5));
            }
            self.inner.clear_field_errors()
        }

        fn set_submit_state(&self, state: SubmitState) {
            self.inner.set_submit_state(state)
        }

        fn show_calculation(&self, result: Option<&CalculationResult>) {
            self.inner.show_calculation(result)
        }

        fn fragment(&self) -> String {
            self.inner.fragment()
        }

        fn set_fragment(&self, fragment: &str) {
            self.inner.set_fragment(fragment)
        }

        fn attach_coordinator(&self, kind: CoordinatorKind) {
            self.inner.attach_coordinator(kind)
        }

        fn detach_coordinator(&self, kind: CoordinatorKind) {
            self.inner.detach_coordinator(kind)
        }
    }

    fn router() -> (Router, crate::test_utils::TestHarness) {
        let harness = test_context();
        let router = Router::new(Arc::new(StaticContentProvider::new()), harness.context.clone());
        (router, harness)
    }

    #[test]
    fn test_initial_state_is_home_without_coordinator() {
        let (router, harness) = router();
        assert_eq!(router.current_page(), PageKey::Home);
        assert_eq!(router.active_coordinator(), None);
        assert!(harness.surface.events().is_empty());
    }

    #[test]
    fn test_unknown_keys_coerce_to_home() {
        let (mut router, harness) = router();
        router.navigate_to("models");

        for requested in ["", "pricing", "../etc/passwd", "<img src=x>"] {
            assert_eq!(router.navigate_to(requested), PageKey::Home);
            assert_eq!(router.current_page(), PageKey::Home);
            assert_eq!(harness.surface.fragment_value(), "#home");
        }
    }

    #[test]
    fn test_navigation_side_effects() {
        let (mut router, harness) = router();
        router.navigate_to("calculator");

        assert_eq!(router.current_page(), PageKey::Calculator);
        assert_eq!(
            router.active_coordinator(),
            Some(CoordinatorKind::SavingsCalculator)
        );
        assert_eq!(harness.surface.content().unwrap().page, PageKey::Calculator);
        assert_eq!(harness.surface.fragment_value(), "#calculator");
        assert_eq!(harness.surface.active_nav(), Some(PageKey::Calculator));
        assert!(harness.surface.calculation().is_some());
        assert_eq!(harness.sink.kinds(), vec!["page_view"]);
    }

    #[test]
    fn test_renavigation_is_idempotent() {
        let (mut router, harness) = router();
        router.navigate_to("contact");
        let first = harness.surface.content();

        router.navigate_to("contact");
        assert_eq!(harness.surface.content(), first);
        assert_eq!(router.active_coordinator(), Some(CoordinatorKind::ContactForm));
        assert_eq!(harness.surface.set_content_count(), 2);
    }

    #[test]
    fn test_coordinator_swap_and_removal() {
        let (mut router, _harness) = router();

        router.navigate_to("contact");
        assert_eq!(router.active_coordinator(), Some(CoordinatorKind::ContactForm));

        router.navigate_to("calculator");
        assert_eq!(
            router.active_coordinator(),
            Some(CoordinatorKind::SavingsCalculator)
        );

        router.navigate_to("solutions");
        assert_eq!(router.active_coordinator(), None);
    }

    #[test]
    fn test_content_failure_falls_back_to_home() {
        let harness = test_context();
        let provider = FailingContentProvider::failing_on(&[PageKey::Contact]);
        let mut router = Router::new(Arc::new(provider), harness.context.clone());

        router.navigate_to("calculator");
        let shown = router.navigate_to("contact");

        assert_eq!(shown, PageKey::Home);
        assert_eq!(router.current_page(), PageKey::Home);
        assert_eq!(router.active_coordinator(), None);
        assert_eq!(harness.surface.content().unwrap().page, PageKey::Home);
        assert_eq!(harness.surface.fragment_value(), "#home");
        assert_eq!(harness.surface.active_nav(), Some(PageKey::Home));
    }

    #[test]
    fn test_total_content_failure_shows_builtin_fallback() {
        let harness = test_context();
        let provider = FailingContentProvider::failing_on(&PageKey::ALL);
        let mut router = Router::new(Arc::new(provider), harness.context.clone());

        assert_eq!(router.navigate_to("models"), PageKey::Home);
        assert_eq!(harness.surface.content(), Some(PageContent::fallback()));
    }

    #[test]
    fn test_render_failure_falls_back_to_home() {
        let (mut router, harness) = router();
        harness.surface.fail_content_for(PageKey::Models);

        assert_eq!(router.navigate_to("models"), PageKey::Home);
        assert_eq!(harness.surface.content().unwrap().page, PageKey::Home);
    }

    #[test]
    fn test_external_route_change_reads_fragment() {
        let (mut router, harness) = router();

        harness.surface.set_fragment_value("#models");
        assert_eq!(router.handle_external_route_change(), PageKey::Models);

        harness.surface.set_fragment_value("");
        assert_eq!(router.handle_external_route_change(), PageKey::Home);

        harness.surface.set_fragment_value("#nowhere");
        assert_eq!(router.handle_external_route_change(), PageKey::Home);
    }

    #[test]
    fn test_link_click_is_tracked() {
        let (mut router, harness) = router();
        router.handle_link_click("solutions");

        assert_eq!(router.current_page(), PageKey::Solutions);
        assert_eq!(harness.sink.kinds(), vec!["click", "page_view"]);
    }

    #[test]
    fn test_unmount_precedes_mount() {
        let (mut router, harness) = router();
        router.navigate_to("contact");
        harness.surface.reset();

        router.navigate_to("calculator");

        let events = harness.surface.events();
        let position = |wanted: &SurfaceEvent| events.iter().position(|e| e == wanted).unwrap();
        let detach = position(&SurfaceEvent::Detach(CoordinatorKind::ContactForm));
        let content = position(&SurfaceEvent::Content(PageKey::Calculator));
        let attach = position(&SurfaceEvent::Attach(CoordinatorKind::SavingsCalculator));
        let calculation = events
            .iter()
            .position(|e| matches!(e, SurfaceEvent::Calculation(_)))
            .unwrap();
        let nav = position(&SurfaceEvent::ActiveNav(PageKey::Calculator));

        assert!(detach < content);
        assert!(content < attach);
        assert!(attach < calculation);
        assert!(calculation < nav);
    }

    #[test]
    fn test_renavigation_swaps_coordinator_once() {
        let (mut router, harness) = router();
        router.navigate_to("calculator");
        harness.surface.reset();

        router.navigate_to("calculator");

        let swaps: Vec<SurfaceEvent> = harness
            .surface
            .events()
            .into_iter()
            .filter(|e| matches!(e, SurfaceEvent::Attach(_) | SurfaceEvent::Detach(_)))
            .collect();
        assert_eq!(
            swaps,
            vec![
                SurfaceEvent::Detach(CoordinatorKind::SavingsCalculator),
                SurfaceEvent::Attach(CoordinatorKind::SavingsCalculator),
            ]
        );
    }

    #[test]
    fn test_repeated_hash_is_not_a_page() {
        let (mut router, harness) = router();

        harness.surface.set_fragment_value("##contact");
        assert_eq!(router.handle_external_route_change(), PageKey::Home);
        assert_eq!(router.active_coordinator(), None);

        harness.surface.set_fragment_value("#");
        assert_eq!(router.handle_external_route_change(), PageKey::Home);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stale_calculation_never_lands_on_next_page() {
        let harness = test_context();
        let gated = Arc::new(GatedSurface::new(Arc::clone(&harness.surface)));
        let mut ctx = harness.context.clone();
        ctx.surface = gated.clone();
        let mut router = Router::new(Arc::new(StaticContentProvider::new()), ctx);
        router.navigate_to("calculator");

        let (entered, release) = gated.hold_next_clear();
        router
            .calculator_input(CalculatorField::VehicleCount, "5")
            .unwrap();
        // The debounced render is now inside the surface, past its mount check
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        let releaser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            let _ = release.send(());
        });
        router.navigate_to("home");
        releaser.join().unwrap();

        let events = harness.surface.events();
        let home = events
            .iter()
            .rposition(|e| *e == SurfaceEvent::Content(PageKey::Home))
            .unwrap();
        assert!(events[home..]
            .iter()
            .all(|e| !matches!(e, SurfaceEvent::Calculation(_))));
        assert_eq!(router.current_page(), PageKey::Home);
    }

    #[tokio::test]
    async fn test_actions_require_matching_coordinator() {
        let (mut router, _harness) = router();
        router.navigate_to("home");

        let err = router.submit_contact(&valid_contact_form()).await.unwrap_err();
        assert!(matches!(err, Error::NotMounted(_)));
        assert!(matches!(
            router.calculator_input(CalculatorField::MonthlyKm, "500"),
            Err(Error::NotMounted(_))
        ));
        assert!(router.recalculate().is_err());
    }

    #[tokio::test]
    async fn test_submission_survives_navigation() {
        let (mut router, harness) = router();
        router.navigate_to("contact");

        let pending = router.begin_contact_submission(&valid_contact_form()).unwrap();
        router.navigate_to("models");
        harness.surface.reset();

        assert!(pending.send().await.is_ok());
        assert!(harness.surface.notifications().is_empty());
        assert_eq!(router.current_page(), PageKey::Models);
    }
}
