//! Usage analytics for fleetswitch
//!
//! Page views, clicks, calculator input, form submissions and page-load
//! timing are emitted as flat JSON records
//! `{session_id, type, ...fields, timestamp}` to an [`EventSink`]. Nothing is
//! transmitted anywhere; the default sink writes to the log.

mod sink;

pub use sink::{EventSink, TracingSink};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{CalculatorField, PageKey};

/// Outcome of a form submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Success,
    ValidationFailed,
    RateLimited,
    TransportFailed,
}

/// One thing a visitor did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    /// A page was displayed
    PageView { page: PageKey },
    /// An interactive element was clicked
    Click {
        element: String,
        target: Option<PageKey>,
    },
    /// A calculator field changed
    CalculatorInput {
        field: CalculatorField,
        value: String,
    },
    /// The contact form was submitted
    FormSubmission {
        form: String,
        outcome: SubmissionOutcome,
        submission_id: Option<String>,
    },
    /// Startup performance timing
    PageLoad { load_time_ms: u64 },
}

impl AnalyticsEvent {
    /// Record type name
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsEvent::PageView { .. } => "page_view",
            AnalyticsEvent::Click { .. } => "click",
            AnalyticsEvent::CalculatorInput { .. } => "calculator_input",
            AnalyticsEvent::FormSubmission { .. } => "form_submission",
            AnalyticsEvent::PageLoad { .. } => "page_load",
        }
    }
}

/// An event stamped with its session and time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsRecord {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub event: AnalyticsEvent,
    pub timestamp: DateTime<Utc>,
}

/// Emits analytics records for one visitor session
#[derive(Clone)]
pub struct Analytics {
    session_id: Uuid,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Analytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analytics")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl Analytics {
    /// Create an emitter for `session_id`
    pub fn new(session_id: Uuid, sink: Arc<dyn EventSink>) -> Self {
        Self { session_id, sink }
    }

    /// Session these records belong to
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Stamp and emit one event
    pub fn track(&self, event: AnalyticsEvent) {
        let record = AnalyticsRecord {
            session_id: self.session_id,
            event,
            timestamp: Utc::now(),
        };
        self.sink.emit(&record);
    }

    pub fn page_view(&self, page: PageKey) {
        self.track(AnalyticsEvent::PageView { page });
    }

    pub fn click(&self, element: impl Into<String>, target: Option<PageKey>) {
        self.track(AnalyticsEvent::Click {
            element: element.into(),
            target,
        });
    }

    pub fn calculator_input(&self, field: CalculatorField, value: impl Into<String>) {
        self.track(AnalyticsEvent::CalculatorInput {
            field,
            value: value.into(),
        });
    }

    pub fn form_submission(
        &self,
        form: impl Into<String>,
        outcome: SubmissionOutcome,
        submission_id: Option<String>,
    ) {
        self.track(AnalyticsEvent::FormSubmission {
            form: form.into(),
            outcome,
            submission_id,
        });
    }

    pub fn page_load(&self, load_time: std::time::Duration) {
        self.track(AnalyticsEvent::PageLoad {
            load_time_ms: u64::try_from(load_time.as_millis()).unwrap_or(u64::MAX),
        });
    }
}
