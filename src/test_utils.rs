//! Test utilities for fleetswitch
//!
//! This module provides recording and mock implementations of the site's
//! collaborators, and helpers to assemble isolated test sessions. Outside the
//! crate's own tests it is only built with the `test-helpers` feature.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::analytics::{Analytics, AnalyticsRecord, EventSink};
use crate::config::Config;
use crate::coordinators::CoordinatorContext;
use crate::error::{Error, Result};
use crate::models::{CalculationResult, ContactForm, CoordinatorKind, FormSubmission, PageKey};
use crate::security::{Clock, RateLimiter, TokenStore};
use crate::site::{
    Notification, PageContent, PageContentProvider, RenderSurface, Site, SiteComponents,
    StaticContentProvider, SubmitState,
};
use crate::submission::{SubmissionClient, SubmissionReceipt};

/// One call made on a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Content(PageKey),
    ActiveNav(PageKey),
    Notification(Notification),
    FieldError { field: String, message: String },
    ClearFieldErrors,
    SubmitState(SubmitState),
    Calculation(Option<CalculationResult>),
    Fragment(String),
    Attach(CoordinatorKind),
    Detach(CoordinatorKind),
}

#[derive(Debug, Default)]
struct SurfaceState {
    events: Vec<SurfaceEvent>,
    content: Option<PageContent>,
    active_nav: Option<PageKey>,
    fragment: String,
    failing_pages: HashSet<PageKey>,
}

/// Render surface that records every call
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget recorded events; displayed content and fragment are kept
    pub fn reset(&self) {
        self.state.lock().unwrap().events.clear();
    }

    /// Make `set_content` fail for `page`
    pub fn fail_content_for(&self, page: PageKey) {
        self.state.lock().unwrap().failing_pages.insert(page);
    }

    /// Change the fragment as the visitor would, without recording an event
    pub fn set_fragment_value(&self, fragment: &str) {
        self.state.lock().unwrap().fragment = fragment.to_string();
    }

    pub fn fragment_value(&self) -> String {
        self.state.lock().unwrap().fragment.clone()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn content(&self) -> Option<PageContent> {
        self.state.lock().unwrap().content.clone()
    }

    pub fn active_nav(&self) -> Option<PageKey> {
        self.state.lock().unwrap().active_nav
    }

    pub fn set_content_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Content(_)))
            .count()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Notification(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// Field errors currently shown, replayed from recorded events
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let mut shown = BTreeMap::new();
        for event in self.events() {
            match event {
                SurfaceEvent::FieldError { field, message } => {
                    shown.insert(field, message);
                },
                SurfaceEvent::ClearFieldErrors => shown.clear(),
                _ => {},
            }
        }
        shown
    }

    pub fn submit_states(&self) -> Vec<SubmitState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::SubmitState(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Last recorded submit state, `Ready` if none
    pub fn submit_state(&self) -> SubmitState {
        self.submit_states().pop().unwrap_or_default()
    }

    /// Result currently shown, per the last recorded calculation event
    pub fn calculation(&self) -> Option<CalculationResult> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::Calculation(result) => Some(result),
            _ => None,
        })?
    }

    pub fn calculation_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Calculation(_)))
            .count()
    }

    fn record(&self, event: SurfaceEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

impl RenderSurface for RecordingSurface {
    fn set_content(&self, content: &PageContent) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_pages.contains(&content.page) {
            return Err(Error::render(format!("refusing {} content", content.page)));
        }
        state.events.push(SurfaceEvent::Content(content.page));
        state.content = Some(content.clone());
        Ok(())
    }

    fn set_active_nav_item(&self, page: PageKey) {
        let mut state = self.state.lock().unwrap();
        state.events.push(SurfaceEvent::ActiveNav(page));
        state.active_nav = Some(page);
    }

    fn show_notification(&self, notification: Notification) {
        self.record(SurfaceEvent::Notification(notification));
    }

    fn set_field_error(&self, field: &str, message: &str) {
        self.record(SurfaceEvent::FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn clear_field_errors(&self) {
        self.record(SurfaceEvent::ClearFieldErrors);
    }

    fn set_submit_state(&self, state: SubmitState) {
        self.record(SurfaceEvent::SubmitState(state));
    }

    fn show_calculation(&self, result: Option<&CalculationResult>) {
        self.record(SurfaceEvent::Calculation(result.copied()));
    }

    fn fragment(&self) -> String {
        self.fragment_value()
    }

    fn set_fragment(&self, fragment: &str) {
        let mut state = self.state.lock().unwrap();
        state.events.push(SurfaceEvent::Fragment(fragment.to_string()));
        state.fragment = fragment.to_string();
    }

    fn attach_coordinator(&self, kind: CoordinatorKind) {
        self.record(SurfaceEvent::Attach(kind));
    }

    fn detach_coordinator(&self, kind: CoordinatorKind) {
        self.record(SurfaceEvent::Detach(kind));
    }
}

/// Event sink keeping records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AnalyticsRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AnalyticsRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Record types in emission order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.event.kind())
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, record: &AnalyticsRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// Submission client recording what it was sent
#[derive(Debug, Default)]
pub struct MockSubmissionClient {
    submissions: Mutex<Vec<FormSubmission>>,
    fail_next: Mutex<Option<String>>,
    delay: Duration,
}

impl MockSubmissionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Make the next submission fail with `message`
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    pub fn submissions(&self) -> Vec<FormSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionClient for MockSubmissionClient {
    async fn submit(&self, submission: &FormSubmission) -> Result<SubmissionReceipt> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(Error::transport(message));
        }

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission.clone());
        Ok(SubmissionReceipt {
            submission_id: format!("MOCK-{}", submissions.len()),
            received_at: Utc::now(),
        })
    }
}

/// Content provider failing for chosen pages
#[derive(Debug, Default)]
pub struct FailingContentProvider {
    failing: HashSet<PageKey>,
}

impl FailingContentProvider {
    pub fn failing_on(pages: &[PageKey]) -> Self {
        Self {
            failing: pages.iter().copied().collect(),
        }
    }
}

impl PageContentProvider for FailingContentProvider {
    fn render(&self, page: PageKey) -> Result<PageContent> {
        if self.failing.contains(&page) {
            return Err(Error::content(format!("no content for {}", page)));
        }
        StaticContentProvider::new().render(page)
    }
}

/// Mock clock for testing.
///
/// All clones share the same time value.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    pub fn new(start: Instant) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        *self.current_time.lock().unwrap() += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

/// A valid contact form
pub fn valid_contact_form() -> ContactForm {
    ContactForm::new("Amina Otieno", "amina@example.co.ke", "0712 345 678")
        .with_company("Nairobi Logistics")
        .with_message("We run 12 diesel delivery vans.")
}

/// Coordinator context wired to recording collaborators
pub struct TestHarness {
    pub context: CoordinatorContext,
    pub surface: Arc<RecordingSurface>,
    pub sink: Arc<MemorySink>,
    pub submissions: Arc<MockSubmissionClient>,
    pub clock: MockClock,
}

/// Build an isolated coordinator context with default configuration
pub fn test_context() -> TestHarness {
    let config = Arc::new(Config::default());
    let surface = Arc::new(RecordingSurface::new());
    let sink = Arc::new(MemorySink::new());
    let submissions = Arc::new(MockSubmissionClient::new());
    let clock = MockClock::new(Instant::now());

    let context = CoordinatorContext {
        rate_limiter: Arc::new(RateLimiter::with_clock(
            config.rate_limit.window(),
            Arc::new(clock.clone()),
        )),
        analytics: Arc::new(Analytics::new(uuid::Uuid::new_v4(), sink.clone())),
        tokens: Arc::new(TokenStore::generate()),
        surface: surface.clone(),
        submissions: submissions.clone(),
        config,
    };

    TestHarness {
        context,
        surface,
        sink,
        submissions,
        clock,
    }
}

/// A site wired to recording collaborators
pub struct SiteHarness {
    pub site: Site,
    pub surface: Arc<RecordingSurface>,
    pub sink: Arc<MemorySink>,
    pub submissions: Arc<MockSubmissionClient>,
    pub clock: MockClock,
}

/// Build an isolated site with default configuration
pub fn test_site() -> SiteHarness {
    test_site_with(Config::default(), MockSubmissionClient::new())
}

/// Build an isolated site with custom configuration and submission client
pub fn test_site_with(config: Config, submissions: MockSubmissionClient) -> SiteHarness {
    let surface = Arc::new(RecordingSurface::new());
    let sink = Arc::new(MemorySink::new());
    let submissions = Arc::new(submissions);
    let clock = MockClock::new(Instant::now());

    let site = Site::with_components(
        Arc::new(config),
        SiteComponents {
            surface: surface.clone(),
            sink: sink.clone(),
            content: Arc::new(StaticContentProvider::new()),
            submissions: submissions.clone(),
            clock: Arc::new(clock.clone()),
            tokens: TokenStore::generate(),
        },
    );

    SiteHarness {
        site,
        surface,
        sink,
        submissions,
        clock,
    }
}
