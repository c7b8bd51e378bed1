//! Site wiring
//!
//! [`Site`] builds every shared instance once per visitor session (session
//! id, CSRF token, rate limiter, analytics emitter), injects them into the
//! router, and records page-load timing for the first render.

pub mod content;
pub mod router;
pub mod surface;

pub use content::{PageContent, PageContentProvider, StaticContentProvider};
pub use router::Router;
pub use surface::{Notification, NotificationLevel, RenderSurface, SubmitState, TerminalSurface};

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::analytics::{Analytics, EventSink};
use crate::config::Config;
use crate::coordinators::CoordinatorContext;
use crate::logging::Timer;
use crate::models::PageKey;
use crate::security::{Clock, RateLimiter, SystemClock, TokenStore};
use crate::submission::{SimulatedSubmissionClient, SubmissionClient};

/// Collaborators a site is assembled from
pub struct SiteComponents {
    pub surface: Arc<dyn RenderSurface>,
    pub sink: Arc<dyn EventSink>,
    pub content: Arc<dyn PageContentProvider>,
    pub submissions: Arc<dyn SubmissionClient>,
    pub clock: Arc<dyn Clock>,
    pub tokens: TokenStore,
}

impl SiteComponents {
    /// Production collaborators around a surface and a sink
    pub fn new(config: &Config, surface: Arc<dyn RenderSurface>, sink: Arc<dyn EventSink>) -> Self {
        let tokens = TokenStore::generate();
        let submissions = SimulatedSubmissionClient::from_config(&config.submission)
            .expecting_token(tokens.clone());
        Self {
            surface,
            sink,
            content: Arc::new(StaticContentProvider::new()),
            submissions: Arc::new(submissions),
            clock: Arc::new(SystemClock::new()),
            tokens,
        }
    }
}

/// One visitor session of the site
pub struct Site {
    session_id: Uuid,
    context: CoordinatorContext,
    router: Router,
    load_timer: Option<Timer>,
}

impl Site {
    /// Assemble a site with the production collaborators
    pub fn new(
        config: Arc<Config>,
        surface: Arc<dyn RenderSurface>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let components = SiteComponents::new(&config, surface, sink);
        Self::with_components(config, components)
    }

    /// Assemble a site from explicit collaborators
    pub fn with_components(config: Arc<Config>, components: SiteComponents) -> Self {
        let load_timer = Timer::start("page_load");
        let session_id = Uuid::new_v4();

        let context = CoordinatorContext {
            rate_limiter: Arc::new(RateLimiter::with_clock(
                config.rate_limit.window(),
                components.clock,
            )),
            analytics: Arc::new(Analytics::new(session_id, components.sink)),
            tokens: Arc::new(components.tokens),
            surface: components.surface,
            submissions: components.submissions,
            config,
        };
        let router = Router::new(components.content, context.clone());

        tracing::info!(session_id = %session_id, "Site session started");

        Self {
            session_id,
            context,
            router,
            load_timer: Some(load_timer),
        }
    }

    /// Render the page named by the address fragment.
    ///
    /// The first call also records page-load timing.
    pub fn start(&mut self) -> PageKey {
        let page = self.router.handle_external_route_change();
        if let Some(timer) = self.load_timer.take() {
            self.context.analytics.page_load(timer.stop());
        }
        page
    }

    /// Clear the rate-limit store once per window in the background
    pub fn spawn_maintenance(&self) -> JoinHandle<()> {
        self.context.rate_limiter.spawn_periodic_clear()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.context.rate_limiter
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.context.tokens
    }

    pub fn analytics(&self) -> &Analytics {
        &self.context.analytics
    }
}
