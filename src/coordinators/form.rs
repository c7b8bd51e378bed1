//! Contact form coordinator

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{CoordinatorContext, MountToken};
use crate::analytics::SubmissionOutcome;
use crate::error::{Error, Result};
use crate::log_error;
use crate::models::{ClientMetadata, ContactForm, CoordinatorKind, FormSubmission, PageKey};
use crate::site::{Notification, RenderSurface, SubmitState};
use crate::submission::SubmissionReceipt;

/// Rate-limit key for contact submissions
pub const CONTACT_SUBMIT_ACTION: &str = "contact_submit";

/// Form name used in analytics records
pub const CONTACT_FORM: &str = "contact";

/// Validates and submits the contact form while the contact page is shown.
pub struct FormCoordinator {
    ctx: CoordinatorContext,
    token: MountToken,
}

impl FormCoordinator {
    /// Bind to a freshly rendered contact page
    pub fn mount(ctx: CoordinatorContext, token: MountToken) -> Self {
        ctx.surface.attach_coordinator(CoordinatorKind::ContactForm);
        ctx.surface.clear_field_errors();
        ctx.surface.set_submit_state(SubmitState::Ready);
        debug!("Contact form mounted");
        Self { ctx, token }
    }

    /// Rate-limit, validate and package a submission, and put the submit
    /// control into its loading state.
    ///
    /// Every refusal is shown to the visitor before the error is returned.
    pub fn prepare(&self, form: &ContactForm) -> Result<PendingSubmission> {
        let surface = &self.ctx.surface;
        let limit = self.ctx.config.rate_limit.contact_submit_limit;

        if !self.ctx.rate_limiter.allow(CONTACT_SUBMIT_ACTION, limit) {
            let err = Error::rate_limit(CONTACT_SUBMIT_ACTION);
            warn!(action = CONTACT_SUBMIT_ACTION, limit, "Contact submission refused");
            surface.show_notification(Notification::warning(err.user_message()));
            self.ctx
                .analytics
                .form_submission(CONTACT_FORM, SubmissionOutcome::RateLimited, None);
            return Err(err);
        }
        debug!(
            remaining = self.ctx.rate_limiter.remaining(CONTACT_SUBMIT_ACTION, limit),
            "Contact submission allowed"
        );

        surface.clear_field_errors();
        if let Err(errors) = form.validate_fields() {
            for error in errors.errors() {
                surface.set_field_error(&error.field, &error.inline_message());
            }
            debug!(invalid_fields = errors.len(), "Contact form rejected");
            let err = Error::from(errors);
            surface.show_notification(Notification::error(err.user_message()));
            self.ctx
                .analytics
                .form_submission(CONTACT_FORM, SubmissionOutcome::ValidationFailed, None);
            return Err(err);
        }

        let submission = FormSubmission::from_form(
            form,
            self.ctx.tokens.token(),
            ClientMetadata {
                session_id: self.ctx.analytics.session_id(),
                page: PageKey::Contact,
                user_agent: self.ctx.config.site.user_agent.clone(),
            },
        );

        let guard = SubmitGuard::engage(Arc::clone(surface), self.token.clone());
        Ok(PendingSubmission {
            submission,
            ctx: self.ctx.clone(),
            token: self.token.clone(),
            _guard: guard,
        })
    }

    /// Prepare and send in one step
    pub async fn submit(&self, form: &ContactForm) -> Result<SubmissionReceipt> {
        self.prepare(form)?.send().await
    }

    pub fn deactivate(self) {
        self.ctx
            .surface
            .detach_coordinator(CoordinatorKind::ContactForm);
        debug!("Contact form unmounted");
    }
}

/// A validated submission waiting to be sent.
///
/// Holds the submit control in its loading state until dropped.
pub struct PendingSubmission {
    submission: FormSubmission,
    ctx: CoordinatorContext,
    token: MountToken,
    _guard: SubmitGuard,
}

impl PendingSubmission {
    /// The payload that will be sent
    pub fn submission(&self) -> &FormSubmission {
        &self.submission
    }

    /// Send the submission and report the outcome to the visitor.
    ///
    /// If the contact page was left meanwhile, the outcome is only logged.
    pub async fn send(self) -> Result<SubmissionReceipt> {
        let result = self.ctx.submissions.submit(&self.submission).await;

        let notification = match &result {
            Ok(receipt) => Notification::success(format!(
                "Thank you! We'll be in touch shortly. Reference: {}",
                receipt.submission_id
            )),
            Err(err) => Notification::error(err.user_message()),
        };
        let surface = &self.ctx.surface;
        let visible = self
            .token
            .while_current(|| surface.show_notification(notification))
            .is_some();

        match &result {
            Ok(receipt) => {
                info!(
                    submission_id = %receipt.submission_id,
                    visible,
                    "Contact submission succeeded"
                );
                self.ctx.analytics.form_submission(
                    CONTACT_FORM,
                    SubmissionOutcome::Success,
                    Some(receipt.submission_id.clone()),
                );
            },
            Err(err) => {
                log_error!(err, "Contact submission failed", visible = visible);
                self.ctx.analytics.form_submission(
                    CONTACT_FORM,
                    SubmissionOutcome::TransportFailed,
                    None,
                );
            },
        }

        result
    }
}

/// Restores the submit control when the submission ends, however it ends.
struct SubmitGuard {
    surface: Arc<dyn RenderSurface>,
    token: MountToken,
}

impl SubmitGuard {
    fn engage(surface: Arc<dyn RenderSurface>, token: MountToken) -> Self {
        surface.set_submit_state(SubmitState::Loading);
        Self { surface, token }
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        let surface = &self.surface;
        self.token
            .while_current(|| surface.set_submit_state(SubmitState::Ready));
    }
}
