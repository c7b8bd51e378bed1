//! Page coordinators
//!
//! A coordinator is the behavior a page needs while it is displayed: the
//! contact form on `contact`, the savings calculator on `calculator`. The
//! router mounts at most one at a time, and every mount is identified by a
//! [`MountToken`] so work finishing after an unmount can tell it must not
//! touch the page any more.

mod calculator;
mod debounce;
mod form;

pub use calculator::CalculatorCoordinator;
pub use debounce::Debouncer;
pub use form::{FormCoordinator, PendingSubmission, CONTACT_FORM, CONTACT_SUBMIT_ACTION};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::analytics::Analytics;
use crate::config::Config;
use crate::models::CoordinatorKind;
use crate::security::{RateLimiter, TokenStore};
use crate::site::RenderSurface;
use crate::submission::SubmissionClient;

/// Counter identifying the current mount; bumped on every mount and unmount.
///
/// Bumping waits for any write a [`MountToken`] is making under the lock.
#[derive(Debug, Clone, Default)]
pub struct MountEpoch(Arc<Mutex<u64>>);

impl MountEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new mount and return its token
    pub fn mount(&self) -> MountToken {
        let mut epoch = lock(&self.0);
        *epoch += 1;
        MountToken {
            epoch: Arc::clone(&self.0),
            id: *epoch,
        }
    }

    /// End the current mount; outstanding tokens become stale
    pub fn unmount(&self) {
        *lock(&self.0) += 1;
    }
}

/// Proof of one particular mount
#[derive(Debug, Clone)]
pub struct MountToken {
    epoch: Arc<Mutex<u64>>,
    id: u64,
}

impl MountToken {
    /// Run `write` if the mount this token was issued for is still active.
    ///
    /// The epoch stays locked while `write` runs, so the mount cannot end
    /// halfway through it.
    pub fn while_current<R>(&self, write: impl FnOnce() -> R) -> Option<R> {
        let epoch = lock(&self.epoch);
        (*epoch == self.id).then(write)
    }
}

fn lock(epoch: &Mutex<u64>) -> MutexGuard<'_, u64> {
    epoch.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared instances every coordinator works with
#[derive(Clone)]
pub struct CoordinatorContext {
    pub config: Arc<Config>,
    pub surface: Arc<dyn RenderSurface>,
    pub analytics: Arc<Analytics>,
    pub rate_limiter: Arc<RateLimiter>,
    pub tokens: Arc<TokenStore>,
    pub submissions: Arc<dyn SubmissionClient>,
}

/// The coordinator mounted for the current page
pub enum PageCoordinator {
    Contact(FormCoordinator),
    Calculator(CalculatorCoordinator),
}

impl PageCoordinator {
    /// Mount the coordinator of `kind`
    pub fn mount(kind: CoordinatorKind, ctx: CoordinatorContext, token: MountToken) -> Self {
        match kind {
            CoordinatorKind::ContactForm => PageCoordinator::Contact(FormCoordinator::mount(ctx, token)),
            CoordinatorKind::SavingsCalculator => {
                PageCoordinator::Calculator(CalculatorCoordinator::mount(ctx, token))
            },
        }
    }

    pub fn kind(&self) -> CoordinatorKind {
        match self {
            PageCoordinator::Contact(_) => CoordinatorKind::ContactForm,
            PageCoordinator::Calculator(_) => CoordinatorKind::SavingsCalculator,
        }
    }

    /// Release everything the coordinator bound to the page
    pub fn deactivate(self) {
        match self {
            PageCoordinator::Contact(form) => form.deactivate(),
            PageCoordinator::Calculator(calculator) => calculator.deactivate(),
        }
    }
}
